//! Detection scoring
//!
//! Turns raw label and text detections into [`ScoreMap`]s. The salience of a
//! detection is the diagonal of its bounding box (in normalized units) scaled
//! by 10 000 and rounded, so a box covering the whole image scores ~14 142.
//!
//! The two scorers are asymmetric:
//! - labels keep the largest qualifying instance, and the larger score when
//!   two detections share a name;
//! - texts are last-write-wins for repeated words.
//!
//! Both are pure functions: same input, same map.

use serde::{Deserialize, Serialize};

use crate::detection::{LabelDetection, ScoreMap, TextDetection, TextType};
use crate::error::{ScoringError, ScoringResult};

/// Boxes whose diagonal is at or below this are noise, not objects.
pub const NOISE_FLOOR: f64 = 0.02;

/// Diagonal → integer score multiplier
pub const SCORE_SCALE: f64 = 10_000.0;

/// Characters stripped from the end of detected words
pub const TRAILING_PUNCTUATION: &[char] = &['.', ',', '!', '?', ':', '#'];

/// Words shorter than this (after normalization) are dropped
pub const MIN_TEXT_CHARS: usize = 3;

pub const DEFAULT_MIN_CONFIDENCE: f64 = 80.0;
pub const DEFAULT_MIN_BOUND: f64 = 0.01;

/// Confidence and size cutoffs shared by the detector call and the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringThresholds {
    /// Minimum overall confidence, 0–100 (inclusive)
    pub min_confidence: f64,
    /// Minimum box width/height as a fraction of the image
    pub min_bound: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_bound: DEFAULT_MIN_BOUND,
        }
    }
}

impl ScoringThresholds {
    pub fn new(min_confidence: f64, min_bound: f64) -> Self {
        Self {
            min_confidence,
            min_bound,
        }
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(ScoringError::InvalidArgument(format!(
                "min_confidence must be within [0, 100], got {}",
                self.min_confidence
            )));
        }
        if self.min_bound.is_nan() || self.min_bound < 0.0 {
            return Err(ScoringError::InvalidArgument(format!(
                "min_bound must be a non-negative fraction, got {}",
                self.min_bound
            )));
        }
        Ok(())
    }
}

/// Euclidean diagonal of a box, in normalized units
pub fn diagonal(width: f64, height: f64) -> f64 {
    (width * width + height * height).sqrt()
}

/// Integer salience for a diagonal. Halves round to even.
pub fn salience(size: f64) -> u32 {
    (size * SCORE_SCALE).round_ties_even() as u32
}

/// Lower-case and strip trailing punctuation from a detected word
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .trim_end_matches(TRAILING_PUNCTUATION)
        .to_string()
}

/// Width and height of one instance box, both present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
}

/// The instance chosen to represent a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceChoice {
    /// Position of the instance in the detection's instance list
    pub index: usize,
    pub size: f64,
}

/// Pick the instance whose box represents the label.
///
/// An instance qualifies when `width >= min_bound`, `height > min_bound` and
/// its diagonal exceeds [`NOISE_FLOOR`]. Among qualifying instances the
/// largest diagonal wins; on a tie the later instance wins.
pub fn select_instance(boxes: &[BoxSize], min_bound: f64) -> Option<InstanceChoice> {
    let mut max_size = 0.0;
    let mut choice = None;

    for (index, b) in boxes.iter().enumerate() {
        if b.width >= min_bound && b.height > min_bound {
            let size = diagonal(b.width, b.height);
            if size > NOISE_FLOOR && size >= max_size {
                choice = Some(InstanceChoice { index, size });
                max_size = size;
            }
        }
    }

    choice
}

struct ScorableLabel {
    name: String,
    confidence: f64,
    boxes: Vec<BoxSize>,
}

impl TryFrom<&LabelDetection> for ScorableLabel {
    type Error = ScoringError;

    fn try_from(detection: &LabelDetection) -> Result<Self, Self::Error> {
        let name = detection
            .name
            .as_deref()
            .ok_or_else(|| ScoringError::MalformedDetection("label without a name".to_string()))?;
        let confidence = detection.confidence.ok_or_else(|| {
            ScoringError::MalformedDetection(format!("label {:?} without a confidence", name))
        })?;

        let boxes = detection
            .instances
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, instance)| {
                let b = instance.bounding_box.as_ref();
                match (b.and_then(|b| b.width), b.and_then(|b| b.height)) {
                    (Some(width), Some(height)) => Ok(BoxSize { width, height }),
                    _ => Err(ScoringError::MalformedDetection(format!(
                        "label {:?} instance {} without a complete bounding box",
                        name, i
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_lowercase(),
            confidence,
            boxes,
        })
    }
}

/// Score label detections.
///
/// Detections below `min_confidence` or without instances are ignored;
/// malformed detections are logged and skipped.
pub fn score_labels(
    detections: &[LabelDetection],
    min_confidence: f64,
    min_bound: f64,
) -> ScoringResult<ScoreMap> {
    ScoringThresholds::new(min_confidence, min_bound).validate()?;

    let mut labels = ScoreMap::new();

    for detection in detections {
        let label = match ScorableLabel::try_from(detection) {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping label detection");
                continue;
            }
        };

        if label.boxes.is_empty()
            || label.confidence.is_nan()
            || label.confidence < min_confidence
        {
            continue;
        }

        if let Some(choice) = select_instance(&label.boxes, min_bound) {
            let score = salience(choice.size);
            labels
                .entry(label.name)
                .and_modify(|existing| *existing = (*existing).max(score))
                .or_insert(score);
        }
    }

    tracing::debug!(
        detections = detections.len(),
        scored = labels.len(),
        "Scored label detections"
    );

    Ok(labels)
}

/// Score text detections.
///
/// Only `WORD` detections count. The thresholds are applied by the detection
/// service for text, so here they are only checked for validity. Repeated
/// words keep the score of the last occurrence.
pub fn score_texts(
    detections: &[TextDetection],
    min_confidence: f64,
    min_bound: f64,
) -> ScoringResult<ScoreMap> {
    ScoringThresholds::new(min_confidence, min_bound).validate()?;

    let mut texts = ScoreMap::new();

    for detection in detections {
        match detection.text_type {
            Some(TextType::Word) => {}
            Some(_) => continue,
            None => {
                tracing::warn!(
                    text = ?detection.detected_text,
                    "Skipping text detection without a type"
                );
                continue;
            }
        }

        let Some(raw) = detection.detected_text.as_deref() else {
            tracing::warn!(id = ?detection.id, "Skipping word detection without text");
            continue;
        };

        let (width, height) = match detection.bounding_box() {
            Some(b) => match (b.width, b.height) {
                (Some(width), Some(height)) => (width, height),
                _ => {
                    tracing::warn!(text = raw, "Skipping word with incomplete bounding box");
                    continue;
                }
            },
            None => {
                tracing::warn!(text = raw, "Skipping word without a bounding box");
                continue;
            }
        };

        let text = normalize_text(raw);
        if text.chars().count() < MIN_TEXT_CHARS {
            continue;
        }

        let size = diagonal(width, height);
        if size > NOISE_FLOOR {
            texts.insert(text, salience(size));
        }
    }

    tracing::debug!(
        detections = detections.len(),
        scored = texts.len(),
        "Scored text detections"
    );

    Ok(texts)
}
