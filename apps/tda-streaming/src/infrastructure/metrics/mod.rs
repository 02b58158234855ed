//! Prometheus Metrics Module
//!
//! Records streaming client activity through the `metrics` facade. Without an
//! installed recorder every call is a no-op, so the library records
//! unconditionally and the binary decides whether to export.
//!
//! # Metrics Categories
//!
//! - **Frames**: inbound frames by kind
//! - **Requests**: outbound requests by service and command
//! - **Deliveries**: handler invocations and dropped items by service
//! - **Latency**: time spent awaiting request responses

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::domain::service::{Command, Service};

// =============================================================================
// Exporter
// =============================================================================

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener
/// cannot be bound.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn register_metrics() {
    describe_counter!(
        "tda_stream_frames_received_total",
        "Inbound frames by kind"
    );
    describe_counter!(
        "tda_stream_requests_sent_total",
        "Outbound requests by service and command"
    );
    describe_counter!(
        "tda_stream_handler_deliveries_total",
        "Handler invocations by service"
    );
    describe_counter!(
        "tda_stream_items_dropped_total",
        "Pushed items not delivered, by reason"
    );
    describe_counter!(
        "tda_stream_websocket_errors_total",
        "WebSocket read and write failures"
    );
    describe_counter!(
        "tda_stream_late_responses_total",
        "Responses discarded because their wait had already ended"
    );
    describe_histogram!(
        "tda_stream_response_wait_seconds",
        "Time between sending a request and receiving its response"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Reasons a pushed item is not delivered.
#[derive(Debug, Clone, Copy)]
pub enum DropReason {
    /// No `service` field and not a heartbeat.
    MissingService,
    /// Service name not in the catalog.
    UnknownService,
    /// Service never dispatches (heartbeat).
    NotDispatchable,
    /// No handlers and no feed receivers.
    NoConsumers,
}

impl DropReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingService => "missing_service",
            Self::UnknownService => "unknown_service",
            Self::NotDispatchable => "not_dispatchable",
            Self::NoConsumers => "no_consumers",
        }
    }
}

/// Record an inbound frame.
pub fn record_frame_received(kind: &'static str) {
    counter!("tda_stream_frames_received_total", "kind" => kind).increment(1);
}

/// Record an outbound request.
pub fn record_request_sent(service: Service, command: Command) {
    counter!(
        "tda_stream_requests_sent_total",
        "service" => service.as_str(),
        "command" => command.as_str()
    )
    .increment(1);
}

/// Record handler invocations for one entry.
pub fn record_deliveries(service: Service, count: u64) {
    counter!(
        "tda_stream_handler_deliveries_total",
        "service" => service.as_str()
    )
    .increment(count);
}

/// Record a pushed item that was not delivered.
pub fn record_item_dropped(reason: DropReason) {
    counter!(
        "tda_stream_items_dropped_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// Record a WebSocket failure.
pub fn record_websocket_error() {
    counter!("tda_stream_websocket_errors_total").increment(1);
}

/// Record a response that arrived after its wait ended.
pub fn record_late_response() {
    counter!("tda_stream_late_responses_total").increment(1);
}

/// Record how long a response took to arrive.
pub fn record_response_wait(command: Command, duration: Duration) {
    histogram!(
        "tda_stream_response_wait_seconds",
        "command" => command.as_str()
    )
    .record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
