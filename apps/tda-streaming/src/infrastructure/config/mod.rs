//! Configuration Module
//!
//! Configuration loading for the streaming binary.

mod settings;

pub use settings::{AccessToken, ConfigError, DEFAULT_API_BASE_URL, StreamConfig};
