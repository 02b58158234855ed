//! TDA Streaming Binary
//!
//! Logs in to the streaming API, subscribes to level-one quotes and logs each
//! update until interrupted.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tda-streaming
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TDA_ACCESS_TOKEN`: OAuth access token for the REST API
//!
//! ## Optional
//! - `TDA_API_BASE_URL`: REST base URL (default: <https://api.tdameritrade.com>)
//! - `TDA_ACCOUNT_ID`: account to stream for (required with several accounts)
//! - `TDA_STREAM_SYMBOLS`: comma-separated symbols (default: GOOG,MSFT)
//! - `TDA_STREAM_QOS`: EXPRESS | REAL_TIME | FAST | MODERATE | SLOW | DELAYED (default: FAST)
//! - `TDA_STREAM_RESPONSE_TIMEOUT_SECS`: response wait limit, 0 = none (default: 0)
//! - `TDA_STREAM_BROADCAST_CAPACITY`: broadcast feed capacity (default: 1024)
//! - `TDA_STREAM_METRICS_PORT`: Prometheus exporter port, 0 = disabled (default: 0)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tda_streaming::infrastructure::telemetry;
use tda_streaming::{
    Handler, HttpPrincipalsClient, Service, StreamClient, StreamConfig, StreamMessage,
    init_metrics, tables,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();
    telemetry::init();

    tracing::info!("Starting TDA streaming client");

    let config = StreamConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    if let Some(port) = config.metrics_port {
        init_metrics(SocketAddr::from(([0, 0, 0, 0], port)))
            .context("failed to start metrics exporter")?;
    }

    let principals = HttpPrincipalsClient::new(&config.api_base_url, config.access_token.clone())?;
    let mut client = StreamClient::new(Arc::new(principals), config.client_config());

    client.login().await?;
    client.quality_of_service(config.qos).await?;

    client.add_handler(Service::Quote, Handler::sync(log_quote))?;

    let symbols: Vec<&str> = config.symbols.iter().map(String::as_str).collect();
    let fields = [
        tables::quote::SYMBOL,
        tables::quote::BID_PRICE,
        tables::quote::ASK_PRICE,
        tables::quote::LAST_PRICE,
        tables::quote::TOTAL_VOLUME,
    ];
    client.level_one_equity_subs(&symbols, Some(&fields)).await?;

    tracing::info!(symbols = ?config.symbols, "Streaming quotes");

    let shutdown_token = CancellationToken::new();
    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let run_result = client.run(shutdown_token).await;

    if client.is_logged_in()
        && let Err(e) = client.logout().await
    {
        tracing::warn!(error = %e, "Logout failed");
    }

    run_result?;
    tracing::info!("TDA streaming client stopped");
    Ok(())
}

/// Log one relabeled quote.
fn log_quote(msg: StreamMessage) {
    tracing::info!(
        symbol = msg.key().unwrap_or_default(),
        bid = ?msg.field(tables::quote::BID_PRICE.name()),
        ask = ?msg.field(tables::quote::ASK_PRICE.name()),
        last = ?msg.field(tables::quote::LAST_PRICE.name()),
        volume = ?msg.field(tables::quote::TOTAL_VOLUME.name()),
        "Quote"
    );
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &StreamConfig) {
    tracing::info!(
        api_base_url = %config.api_base_url,
        account_id = config.account_id.as_deref().unwrap_or("<single>"),
        symbols = config.symbols.len(),
        qos = ?config.qos,
        response_timeout = ?config.response_timeout,
        metrics_port = ?config.metrics_port,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
