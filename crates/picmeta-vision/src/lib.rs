//! Picmeta Vision
//!
//! Detection records, the detection scorer and the vision service
//! abstraction used by the worker.

pub mod detection;
pub mod detector;
pub mod error;
pub mod scorer;
pub mod validation;

#[cfg(feature = "rekognition")]
pub mod rekognition;

pub use detection::{
    BoundingBox, Geometry, LabelDetection, LabelInstance, ScoreMap, TextDetection, TextType,
};
pub use detector::VisionDetector;
pub use error::{ScoringError, ScoringResult};
pub use scorer::{score_labels, score_texts, ScoringThresholds};
pub use validation::{validate_image_size, validate_size};

#[cfg(feature = "rekognition")]
pub use rekognition::RekognitionDetector;

// Test helpers (only available in test mode)
#[cfg(test)]
pub mod test_helpers;
