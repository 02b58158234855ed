#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! TDA Streaming - Streaming Protocol Client
//!
//! Client for the TD Ameritrade streaming API. One WebSocket carries admin
//! commands, subscription requests, their responses and all pushed data; this
//! crate logs in over it, correlates responses with requests by ID, and hands
//! pushed updates to per-service handlers with numeric field codes renamed.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: protocol data with no I/O
//!   - `fields`: per-message `(code, name)` tables and relabeling
//!   - `service`: service catalog, commands, quality-of-service levels
//!
//! - **Application**: port definitions
//!   - `ports`: the user principals collaborator
//!
//! - **Infrastructure**: adapters and external integrations
//!   - `tda`: streaming client, codec, correlator, dispatcher
//!   - `principals`: REST adapter for user principals
//!   - `config`: environment configuration
//!   - `metrics`, `telemetry`: observability
//!
//! # Data Flow
//!
//! ```text
//! caller ──► subscribe ──► Correlator (id) ──► socket
//!
//! socket ──► handle_message ──┬── response ──► Correlator ──► waiting caller
//!                             └── data ──► relabel ──► handlers, broadcast feed
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Protocol data with no external dependencies.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::fields::{Field, FieldRegistry, join_field_codes, tables};
pub use domain::service::{Command, FieldLayout, QosLevel, Service, ServiceDescriptor};

// Ports
pub use application::ports::{
    PrincipalAccount, PrincipalsError, PrincipalsProvider, StreamerInfo, StreamerSubscriptionKeys,
    SubscriptionKey, UserPrincipals,
};

// Streaming client
pub use infrastructure::tda::{
    AuthError, CodecError, CorrelationError, Handler, HandlerId, RequestEnvelope, StreamClient,
    StreamClientConfig, StreamClientError, StreamMessage, StreamSession,
};

// Principals adapter
pub use infrastructure::principals::HttpPrincipalsClient;

// Configuration
pub use infrastructure::config::{AccessToken, ConfigError, StreamConfig};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
