//! Test helpers: in-memory collaborators and image fixtures for handler tests.
//!
//! Run from workspace root: `cargo test -p picmeta-worker --test handler_test`.

#![allow(dead_code)]

pub mod detector;
pub mod fixtures;
pub mod storage;

pub use detector::StaticDetector;
pub use storage::MemoryStorage;
