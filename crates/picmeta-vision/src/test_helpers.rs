//! Test fixtures for building detection records

use crate::detection::{
    BoundingBox, Geometry, LabelDetection, LabelInstance, TextDetection, TextType,
};

/// Label with one instance per `(width, height)` pair
pub fn label(name: &str, confidence: f64, boxes: &[(f64, f64)]) -> LabelDetection {
    let instances = boxes
        .iter()
        .map(|&(w, h)| LabelInstance {
            bounding_box: Some(BoundingBox::sized(w, h)),
            confidence: Some(confidence),
        })
        .collect();
    label_with_instances(name, confidence, instances)
}

pub fn label_with_instances(
    name: &str,
    confidence: f64,
    instances: Vec<LabelInstance>,
) -> LabelDetection {
    LabelDetection {
        name: Some(name.to_string()),
        confidence: Some(confidence),
        instances: Some(instances),
    }
}

fn text(detected: &str, text_type: TextType, width: f64, height: f64) -> TextDetection {
    TextDetection {
        detected_text: Some(detected.to_string()),
        text_type: Some(text_type),
        confidence: Some(99.0),
        id: None,
        parent_id: None,
        geometry: Some(Geometry {
            bounding_box: Some(BoundingBox::sized(width, height)),
        }),
    }
}

pub fn word(detected: &str, width: f64, height: f64) -> TextDetection {
    text(detected, TextType::Word, width, height)
}

pub fn line(detected: &str, width: f64, height: f64) -> TextDetection {
    text(detected, TextType::Line, width, height)
}
