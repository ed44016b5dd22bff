//! AWS Rekognition detector

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{
    self as rk, DetectTextFilters, DetectionFilter, Image, TextTypes,
};
use aws_sdk_rekognition::Client as RekognitionClient;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::detection::{
    BoundingBox, Geometry, LabelDetection, LabelInstance, TextDetection, TextType,
};
use crate::detector::VisionDetector;

/// Detector backed by the Rekognition `DetectLabels` and `DetectText` APIs
#[derive(Clone)]
pub struct RekognitionDetector {
    client: RekognitionClient,
}

impl Debug for RekognitionDetector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RekognitionDetector").finish()
    }
}

impl RekognitionDetector {
    /// Build a client from the default AWS config chain, optionally pinning the region
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        tracing::info!(
            region = ?config.region(),
            "Rekognition client initialized"
        );

        Self::from_client(RekognitionClient::new(&config))
    }

    pub fn from_client(client: RekognitionClient) -> Self {
        Self { client }
    }

    fn image(data: &[u8]) -> Image {
        Image::builder().bytes(Blob::new(data.to_vec())).build()
    }
}

impl From<&rk::BoundingBox> for BoundingBox {
    fn from(b: &rk::BoundingBox) -> Self {
        Self {
            width: b.width().map(f64::from),
            height: b.height().map(f64::from),
            left: b.left().map(f64::from),
            top: b.top().map(f64::from),
        }
    }
}

impl From<&rk::Instance> for LabelInstance {
    fn from(instance: &rk::Instance) -> Self {
        Self {
            bounding_box: instance.bounding_box().map(BoundingBox::from),
            confidence: instance.confidence().map(f64::from),
        }
    }
}

impl From<&rk::Label> for LabelDetection {
    fn from(label: &rk::Label) -> Self {
        Self {
            name: label.name().map(String::from),
            confidence: label.confidence().map(f64::from),
            instances: Some(label.instances().iter().map(LabelInstance::from).collect()),
        }
    }
}

impl From<&TextTypes> for TextType {
    fn from(t: &TextTypes) -> Self {
        match t {
            TextTypes::Word => TextType::Word,
            TextTypes::Line => TextType::Line,
            _ => TextType::Other,
        }
    }
}

impl From<&rk::TextDetection> for TextDetection {
    fn from(detection: &rk::TextDetection) -> Self {
        Self {
            detected_text: detection.detected_text().map(String::from),
            text_type: detection.r#type().map(TextType::from),
            confidence: detection.confidence().map(f64::from),
            id: detection.id(),
            parent_id: detection.parent_id(),
            geometry: detection.geometry().map(|g| Geometry {
                bounding_box: g.bounding_box().map(BoundingBox::from),
            }),
        }
    }
}

/// Word filter applied server-side by `DetectText`
fn word_filter(min_confidence: f64, min_bound: f64) -> DetectTextFilters {
    DetectTextFilters::builder()
        .word_filter(
            DetectionFilter::builder()
                .min_confidence(min_confidence as f32)
                .min_bounding_box_height(min_bound as f32)
                .min_bounding_box_width(min_bound as f32)
                .build(),
        )
        .build()
}

#[async_trait]
impl VisionDetector for RekognitionDetector {
    fn name(&self) -> &str {
        "aws_rekognition"
    }

    async fn detect_labels(&self, image: &[u8], min_confidence: f64) -> Result<Vec<LabelDetection>> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .detect_labels()
            .image(Self::image(image))
            .min_confidence(min_confidence as f32)
            .send()
            .await
            .context("Failed to detect labels")?;

        let labels: Vec<LabelDetection> =
            response.labels().iter().map(LabelDetection::from).collect();

        tracing::debug!(
            labels_count = labels.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rekognition label detection completed"
        );

        Ok(labels)
    }

    async fn detect_text(
        &self,
        image: &[u8],
        min_confidence: f64,
        min_bound: f64,
    ) -> Result<Vec<TextDetection>> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .detect_text()
            .image(Self::image(image))
            .filters(word_filter(min_confidence, min_bound))
            .send()
            .await
            .context("Failed to detect text")?;

        let texts: Vec<TextDetection> = response
            .text_detections()
            .iter()
            .map(TextDetection::from)
            .collect();

        tracing::debug!(
            text_count = texts.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rekognition text detection completed"
        );

        Ok(texts)
    }
}
