//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the streaming socket client.

/// Streaming WebSocket client (login, correlation, dispatch, subscriptions).
pub mod tda;

/// HTTP adapter for the user principals port.
pub mod principals;

/// Configuration loading.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber setup.
pub mod telemetry;
