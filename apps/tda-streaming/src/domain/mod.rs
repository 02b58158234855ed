//! Domain Layer - Protocol vocabulary with no I/O.
//!
//! Field tables and the service catalog are pure data: they describe the
//! wire schema and know how to relabel payloads, nothing more.

/// Numeric field codes and payload relabeling.
pub mod fields;

/// Stream services, commands and quality-of-service levels.
pub mod service;
