//! Application Layer - Port definitions.
//!
//! The streaming client depends on the broker's REST API only for the user
//! principals document. That dependency is expressed as a port so the
//! client can be driven by any source of principals.

/// Port interfaces for external systems.
pub mod ports;
