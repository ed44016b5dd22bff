use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use picmeta_vision::{
    BoundingBox, Geometry, LabelDetection, LabelInstance, TextDetection, TextType,
};
use std::io::Cursor;

/// Small RGB image encoded as `format`
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 120, 40])));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

pub fn label(name: &str, confidence: f64, boxes: &[(f64, f64)]) -> LabelDetection {
    LabelDetection {
        name: Some(name.to_string()),
        confidence: Some(confidence),
        instances: Some(
            boxes
                .iter()
                .map(|&(w, h)| LabelInstance {
                    bounding_box: Some(BoundingBox::sized(w, h)),
                    confidence: Some(confidence),
                })
                .collect(),
        ),
    }
}

pub fn word(text: &str, width: f64, height: f64) -> TextDetection {
    TextDetection {
        detected_text: Some(text.to_string()),
        text_type: Some(TextType::Word),
        confidence: Some(99.0),
        geometry: Some(Geometry {
            bounding_box: Some(BoundingBox::sized(width, height)),
        }),
        ..Default::default()
    }
}

/// SQS body carrying an S3 put notification for each key
pub fn s3_event(bucket: &str, keys: &[&str]) -> String {
    let records: Vec<serde_json::Value> = keys
        .iter()
        .map(|key| {
            serde_json::json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": bucket},
                    "object": {"key": key}
                }
            })
        })
        .collect();
    serde_json::json!({ "Records": records }).to_string()
}
