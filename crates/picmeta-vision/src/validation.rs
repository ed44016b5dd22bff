//! Input guards for detector calls
//!
//! Rekognition accepts at most 5 MB of inline image bytes; anything larger
//! must be rejected before the request is built.

use anyhow::Result;

/// Inline image limit of the detection APIs (5 MB)
pub const MAX_INLINE_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Validate that data size is within acceptable limits
///
/// # Example
/// ```
/// # use picmeta_vision::validation::validate_size;
/// let data = vec![0u8; 1000];
/// assert!(validate_size(&data, 2000).is_ok());
/// assert!(validate_size(&data, 500).is_err());
/// ```
pub fn validate_size(data: &[u8], max_size: usize) -> Result<()> {
    let size = data.len();

    if size > max_size {
        return Err(anyhow::anyhow!(
            "Image size ({} bytes) exceeds maximum allowed size ({} bytes)",
            size,
            max_size
        ));
    }

    tracing::debug!(size = size, max_size = max_size, "Image size validation passed");

    Ok(())
}

/// Validate against the inline limit, or a stricter configured one
pub fn validate_image_size(data: &[u8], configured_max: usize) -> Result<()> {
    validate_size(data, configured_max.min(MAX_INLINE_IMAGE_SIZE))
}
