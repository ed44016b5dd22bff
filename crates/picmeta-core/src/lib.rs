//! picmeta Core Library
//!
//! This crate provides the configuration, error types and shared enums used
//! across all picmeta components.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, WorkerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
