//! picmeta Infrastructure Library
//!
//! This crate provides shared infrastructure used by the picmeta binaries:
//! - Telemetry initialization (tracing subscriber, log filtering)

pub mod telemetry;

// Re-export commonly used types
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryOptions};
