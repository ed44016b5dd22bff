//! Raw detection records as returned by a vision service
//!
//! Field names follow the Rekognition wire format (PascalCase), so JSON dumps
//! of `DetectLabels` / `DetectText` responses deserialize directly. Every field
//! is optional: the scorer decides what is malformed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized name → salience score.
///
/// Ordered so serialized sidecars are byte-stable across runs.
pub type ScoreMap = BTreeMap<String, u32>;

/// Bounding box expressed as fractions (0.0–1.0) of the image dimensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
}

impl BoundingBox {
    /// Box with only a size, positioned at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            left: Some(0.0),
            top: Some(0.0),
        }
    }
}

/// One occurrence of a label inside the image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A label detection (object, scene or concept)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Overall confidence, 0–100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// `None` when the service reported no instance list at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<LabelInstance>>,
}

/// Granularity of a text detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextType {
    Word,
    Line,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// A text detection (a word or a whole line)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextDetection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_text: Option<String>,
    #[serde(default, rename = "Type", skip_serializing_if = "Option::is_none")]
    pub text_type: Option<TextType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl TextDetection {
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.geometry.as_ref()?.bounding_box.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rekognition_labels() {
        let raw = r#"[
            {
                "Name": "Dog",
                "Confidence": 98.5,
                "Instances": [
                    {"BoundingBox": {"Width": 0.1, "Height": 0.2, "Left": 0.3, "Top": 0.4}, "Confidence": 97.0}
                ],
                "Parents": [{"Name": "Animal"}]
            },
            {"Name": "Outdoors", "Confidence": 88.0, "Instances": []}
        ]"#;

        let labels: Vec<LabelDetection> = serde_json::from_str(raw).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name.as_deref(), Some("Dog"));
        let instances = labels[0].instances.as_ref().unwrap();
        assert_eq!(instances[0].bounding_box.as_ref().unwrap().height, Some(0.2));
        assert_eq!(labels[1].instances.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_deserialize_rekognition_text() {
        let raw = r#"[
            {"DetectedText": "Hello world", "Type": "LINE", "Id": 0, "Confidence": 99.1,
             "Geometry": {"BoundingBox": {"Width": 0.4, "Height": 0.05}}},
            {"DetectedText": "Hello", "Type": "WORD", "Id": 1, "ParentId": 0, "Confidence": 99.0,
             "Geometry": {"BoundingBox": {"Width": 0.2, "Height": 0.05}}},
            {"DetectedText": "?", "Type": "PARAGRAPH"}
        ]"#;

        let texts: Vec<TextDetection> = serde_json::from_str(raw).unwrap();
        assert_eq!(texts[0].text_type, Some(TextType::Line));
        assert_eq!(texts[1].text_type, Some(TextType::Word));
        assert_eq!(texts[1].parent_id, Some(0));
        assert_eq!(texts[1].bounding_box().unwrap().width, Some(0.2));
        assert_eq!(texts[2].text_type, Some(TextType::Other));
        assert!(texts[2].bounding_box().is_none());
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let label: LabelDetection = serde_json::from_str(r#"{"Name": "Cat"}"#).unwrap();
        assert!(label.confidence.is_none());
        assert!(label.instances.is_none());
    }
}
