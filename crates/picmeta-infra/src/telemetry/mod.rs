//! Tracing initialization
//!
//! Verbosity is an explicit option handed in by the caller (usually derived
//! from `VERBOSE_MODE`), not read from the environment at log time.

mod init_basic;

pub use init_basic::{default_filter, init_telemetry, shutdown_telemetry, TelemetryOptions};
