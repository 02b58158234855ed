//! Tracing Initialization
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`, with
//! this crate at `info` unless overridden.
//!
//! # Usage
//!
//! ```ignore
//! use tda_streaming::infrastructure::telemetry;
//!
//! telemetry::init();
//! tracing::info!("Streaming");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default directives applied beneath `RUST_LOG`.
const DEFAULT_DIRECTIVES: [&str; 3] = ["tda_streaming=info", "tungstenite=warn", "hyper=warn"];

/// Build the log filter from `RUST_LOG` plus the default directives.
#[must_use]
pub fn env_filter() -> EnvFilter {
    DEFAULT_DIRECTIVES
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for directive in DEFAULT_DIRECTIVES {
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
        }
    }

    #[test]
    fn env_filter_includes_crate_directive() {
        let filter = env_filter().to_string();
        assert!(filter.contains("tda_streaming=info"));
    }
}
