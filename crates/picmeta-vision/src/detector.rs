//! Vision service abstraction
//!
//! The worker holds an `Arc<dyn VisionDetector>` so the Rekognition client
//! can be swapped for a canned detector in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::detection::{LabelDetection, TextDetection};

#[async_trait]
pub trait VisionDetector: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Detect labels whose overall confidence is at least `min_confidence`
    async fn detect_labels(&self, image: &[u8], min_confidence: f64)
        -> Result<Vec<LabelDetection>>;

    /// Detect text. Implementations filter words by confidence and box size
    /// themselves; the scorer does not reapply these thresholds.
    async fn detect_text(
        &self,
        image: &[u8],
        min_confidence: f64,
        min_bound: f64,
    ) -> Result<Vec<TextDetection>>;
}
