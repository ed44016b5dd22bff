//! Shared key helpers for storage backends.

use crate::traits::{ObjectLocation, StorageError, StorageResult};

/// Reject locations that could escape a backend's namespace.
///
/// Bucket names must be a single non-empty path segment; keys must be
/// non-empty, must not start with `/` and must not contain `..` segments.
pub fn validate_location(location: &ObjectLocation) -> StorageResult<()> {
    let bucket = location.bucket.as_str();
    if bucket.is_empty() || bucket.contains('/') || bucket.contains('\\') || bucket == ".." {
        return Err(StorageError::InvalidKey(format!(
            "invalid bucket name: {:?}",
            bucket
        )));
    }

    let key = location.key.as_str();
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "invalid object key: {:?}",
            key
        )));
    }

    Ok(())
}
