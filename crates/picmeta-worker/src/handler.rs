//! Per-object processing: download, inspect, detect, score, write sidecar

use chrono::Utc;
use picmeta_core::{AppError, Config, ErrorMetadata, LogLevel};
use picmeta_processing::{ImageInspector, MetadataRecord, ProcessingError};
use picmeta_storage::{ObjectLocation, Storage, StorageError};
use picmeta_vision::{
    score_labels, score_texts, validate_image_size, ScoringError, ScoringThresholds,
    VisionDetector,
};
use std::sync::Arc;
use std::time::Instant;

use crate::filter::ImageFilter;

pub const METADATA_CONTENT_TYPE: &str = "application/json";

/// Knobs for [`ImageHandler`], usually taken from [`Config`]
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub thresholds: ScoringThresholds,
    pub image_extensions: Vec<String>,
    pub max_image_size_bytes: usize,
    pub metadata_suffix: String,
}

impl HandlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: ScoringThresholds::new(config.min_confidence(), config.min_bound()),
            image_extensions: config.image_extensions().to_vec(),
            max_image_size_bytes: config.max_image_size_bytes(),
            metadata_suffix: config.metadata_suffix().to_string(),
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            thresholds: ScoringThresholds::default(),
            image_extensions: ["jpg", "jpeg", "png", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_image_size_bytes: 5 * 1024 * 1024,
            metadata_suffix: "--metadata.json".to_string(),
        }
    }
}

/// What happened to one object
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Sidecar written
    Processed {
        metadata: ObjectLocation,
        url: String,
        labels: usize,
        texts: usize,
    },
    /// Key does not look like an image
    Skipped,
}

fn storage_error(location: &ObjectLocation, e: StorageError) -> AppError {
    match e {
        StorageError::NotFound(_) => AppError::NotFound(location.to_string()),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        other => AppError::Storage(other.to_string()),
    }
}

fn processing_error(e: ProcessingError) -> AppError {
    AppError::ImageProcessing(e.to_string())
}

fn scoring_error(e: ScoringError) -> AppError {
    AppError::InvalidInput(e.to_string())
}

pub struct ImageHandler {
    storage: Arc<dyn Storage>,
    detector: Arc<dyn VisionDetector>,
    filter: ImageFilter,
    settings: HandlerSettings,
}

impl ImageHandler {
    pub fn new(
        storage: Arc<dyn Storage>,
        detector: Arc<dyn VisionDetector>,
        settings: HandlerSettings,
    ) -> Result<Self, AppError> {
        settings
            .thresholds
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        let filter = ImageFilter::new(settings.image_extensions.clone())
            .map_err(|e| AppError::Config(e.to_string()))?;

        tracing::info!(
            storage = %storage.backend_type(),
            detector = detector.name(),
            min_confidence = settings.thresholds.min_confidence,
            min_bound = settings.thresholds.min_bound,
            extensions = ?settings.image_extensions,
            "Image handler ready"
        );

        Ok(Self {
            storage,
            detector,
            filter,
            settings,
        })
    }

    /// Key of the sidecar written for `location`
    pub fn metadata_location(&self, location: &ObjectLocation) -> ObjectLocation {
        location.with_key(format!("{}{}", location.key, self.settings.metadata_suffix))
    }

    /// Process `location` if its key passes the image filter
    pub async fn handle(&self, location: &ObjectLocation) -> Result<Outcome, AppError> {
        if !self.filter.is_image(&location.key) {
            tracing::debug!(bucket = %location.bucket, key = %location.key, "Skipping non-image object");
            return Ok(Outcome::Skipped);
        }
        self.process(location).await
    }

    #[tracing::instrument(skip(self), fields(bucket = %location.bucket, key = %location.key))]
    pub async fn process(&self, location: &ObjectLocation) -> Result<Outcome, AppError> {
        let start = Instant::now();
        tracing::debug!("Processing image");

        let object = self
            .storage
            .download(location)
            .await
            .map_err(|e| storage_error(location, e))?;

        validate_image_size(&object.data, self.settings.max_image_size_bytes)
            .map_err(|e| AppError::PayloadTooLarge(e.to_string()))?;

        let inspection = ImageInspector::inspect(&object.data).map_err(processing_error)?;

        let thresholds = self.settings.thresholds;
        let (label_records, text_records) = tokio::try_join!(
            self.detector
                .detect_labels(&object.data, thresholds.min_confidence),
            self.detector.detect_text(
                &object.data,
                thresholds.min_confidence,
                thresholds.min_bound
            ),
        )
        .map_err(|e| AppError::Vision(format!("{:#}", e)))?;

        let labels = score_labels(&label_records, thresholds.min_confidence, thresholds.min_bound)
            .map_err(scoring_error)?;
        let texts = score_texts(&text_records, thresholds.min_confidence, thresholds.min_bound)
            .map_err(scoring_error)?;

        let (label_count, text_count) = (labels.len(), texts.len());
        let record = MetadataRecord::new(
            inspection,
            Utc::now(),
            object.last_modified,
            labels,
            texts,
        );
        let body = record
            .to_json()
            .map_err(|e| AppError::Internal(format!("Failed to serialize metadata: {}", e)))?;

        let metadata = self.metadata_location(location);
        let url = self
            .storage
            .upload(&metadata, body, METADATA_CONTENT_TYPE)
            .await
            .map_err(|e| storage_error(&metadata, e))?;

        tracing::info!(
            metadata_key = %metadata.key,
            labels_count = label_count,
            texts_count = text_count,
            size_bytes = object.data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Done processing image"
        );

        Ok(Outcome::Processed {
            metadata,
            url,
            labels: label_count,
            texts: text_count,
        })
    }
}

/// Log a per-object failure at the level its error kind calls for
pub fn log_failure(location: &ObjectLocation, error: &AppError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(bucket = %location.bucket, key = %location.key, error_code = code, error = %error, "Image not processed")
        }
        LogLevel::Warn => {
            tracing::warn!(bucket = %location.bucket, key = %location.key, error_code = code, error = %error, "Image not processed")
        }
        LogLevel::Error => {
            tracing::error!(bucket = %location.bucket, key = %location.key, error_code = code, recoverable = error.is_recoverable(), error = %error, "Image processing failed")
        }
    }
}
