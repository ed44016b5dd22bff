//! picmeta Storage Library
//!
//! This crate provides the object-store abstraction used by the worker to
//! fetch uploaded images and write metadata sidecars back next to them.
//! It includes the Storage trait and implementations for S3 and the local
//! filesystem.
//!
//! # Locations
//!
//! Every object is addressed by an [`ObjectLocation`] (bucket + key). Keys must
//! not contain `..` segments or a leading `/`; validation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use picmeta_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectLocation, Storage, StorageError, StorageResult, StoredObject};
