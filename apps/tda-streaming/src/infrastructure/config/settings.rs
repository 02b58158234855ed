//! Streaming Configuration Settings
//!
//! Configuration types for the streaming binary, loaded from environment
//! variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TDA_ACCESS_TOKEN` | required |
//! | `TDA_API_BASE_URL` | `https://api.tdameritrade.com` |
//! | `TDA_ACCOUNT_ID` | none (single-account users) |
//! | `TDA_STREAM_SYMBOLS` | `GOOG,MSFT` |
//! | `TDA_STREAM_QOS` | `FAST` |
//! | `TDA_STREAM_RESPONSE_TIMEOUT_SECS` | `0` (wait indefinitely) |
//! | `TDA_STREAM_BROADCAST_CAPACITY` | `1024` |
//! | `TDA_STREAM_METRICS_PORT` | `0` (exporter disabled) |

use std::time::Duration;

use crate::domain::service::QosLevel;
use crate::infrastructure::tda::{DEFAULT_BROADCAST_CAPACITY, StreamClientConfig};

/// Default REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.tdameritrade.com";

/// OAuth access token for the REST API.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Get the token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Complete streaming configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// REST access token used to fetch user principals.
    pub access_token: AccessToken,
    /// REST API base URL.
    pub api_base_url: String,
    /// Account to stream for.
    pub account_id: Option<String>,
    /// Symbols subscribed to on startup.
    pub symbols: Vec<String>,
    /// Requested quality of service.
    pub qos: QosLevel,
    /// Response wait limit, `None` to wait indefinitely.
    pub response_timeout: Option<Duration>,
    /// Broadcast feed capacity.
    pub broadcast_capacity: usize,
    /// Prometheus exporter port, `None` when disabled.
    pub metrics_port: Option<u16>,
}

impl StreamConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or a
    /// value cannot be interpreted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("TDA_ACCESS_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("TDA_ACCESS_TOKEN".to_string()))?;
        if access_token.is_empty() {
            return Err(ConfigError::EmptyValue("TDA_ACCESS_TOKEN".to_string()));
        }

        let api_base_url = lookup("TDA_API_BASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let account_id = lookup("TDA_ACCOUNT_ID").filter(|v| !v.is_empty());

        let symbols = lookup("TDA_STREAM_SYMBOLS").map_or_else(
            || vec!["GOOG".to_string(), "MSFT".to_string()],
            |v| parse_symbols(&v),
        );

        let qos = match lookup("TDA_STREAM_QOS") {
            Some(v) => QosLevel::from_str_case_insensitive(&v).ok_or(ConfigError::InvalidValue {
                key: "TDA_STREAM_QOS".to_string(),
                value: v,
            })?,
            None => QosLevel::default(),
        };

        let response_timeout = parse_u64(&lookup, "TDA_STREAM_RESPONSE_TIMEOUT_SECS", 0);
        let response_timeout =
            (response_timeout > 0).then(|| Duration::from_secs(response_timeout));

        let broadcast_capacity = lookup("TDA_STREAM_BROADCAST_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BROADCAST_CAPACITY);

        let metrics_port = lookup("TDA_STREAM_METRICS_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|port| *port > 0);

        Ok(Self {
            access_token: AccessToken::new(access_token),
            api_base_url,
            account_id,
            symbols,
            qos,
            response_timeout,
            broadcast_capacity,
            metrics_port,
        })
    }

    /// Streaming client configuration derived from these settings.
    #[must_use]
    pub fn client_config(&self) -> StreamClientConfig {
        StreamClientConfig {
            account_id: self.account_id.clone(),
            response_timeout: self.response_timeout,
            broadcast_capacity: self.broadcast_capacity,
            tls: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has an unusable value.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<StreamConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StreamConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingEnvVar(_))));
        assert!(matches!(
            config(&[("TDA_ACCESS_TOKEN", "")]),
            Err(ConfigError::EmptyValue(_))
        ));
    }

    #[test]
    fn defaults() {
        let config = config(&[("TDA_ACCESS_TOKEN", "tok")]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.account_id, None);
        assert_eq!(config.symbols, vec!["GOOG", "MSFT"]);
        assert_eq!(config.qos, QosLevel::Fast);
        assert_eq!(config.response_timeout, None);
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("TDA_ACCESS_TOKEN", "tok"),
            ("TDA_ACCOUNT_ID", "1001"),
            ("TDA_STREAM_SYMBOLS", " spy, qqq ,,"),
            ("TDA_STREAM_QOS", "express"),
            ("TDA_STREAM_RESPONSE_TIMEOUT_SECS", "10"),
            ("TDA_STREAM_BROADCAST_CAPACITY", "64"),
            ("TDA_STREAM_METRICS_PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(config.account_id.as_deref(), Some("1001"));
        assert_eq!(config.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(config.qos, QosLevel::Express);
        assert_eq!(config.response_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.metrics_port, Some(9090));

        let client = config.client_config();
        assert_eq!(client.account_id.as_deref(), Some("1001"));
        assert_eq!(client.broadcast_capacity, 64);
    }

    #[test]
    fn invalid_qos_is_rejected() {
        assert!(matches!(
            config(&[("TDA_ACCESS_TOKEN", "tok"), ("TDA_STREAM_QOS", "turbo")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn access_token_redacted_debug() {
        let config = config(&[("TDA_ACCESS_TOKEN", "secret456")]).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }
}
