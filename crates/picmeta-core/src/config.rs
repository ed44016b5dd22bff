//! Configuration module
//!
//! This module provides the worker configuration: queue, storage, vision
//! thresholds and logging settings. Values are read from the process
//! environment (after loading an optional `.env` file).

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const SQS_WAIT_TIME_SECONDS: i32 = 20;
const SQS_MAX_MESSAGES: i32 = 10;
const WORKER_MAX_CONCURRENCY: usize = 4;
const MIN_CONFIDENCE: f64 = 80.0;
const MIN_BOUND: f64 = 0.01;
const MAX_IMAGE_SIZE_MB: usize = 5;
const IMAGE_EXTENSIONS: &str = "jpg,jpeg,png,gif";
const METADATA_SUFFIX: &str = "--metadata.json";

/// Worker configuration
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub environment: String,
    // Logging
    pub verbose: bool,
    pub log_json: bool,
    // AWS
    pub aws_region: Option<String>,
    // Queue configuration
    pub sqs_queue_url: Option<String>,
    pub sqs_wait_time_seconds: i32,
    pub sqs_max_messages: i32,
    pub worker_max_concurrency: usize,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, LocalStack, etc.)
    pub local_storage_path: Option<String>,
    // Detection thresholds
    pub min_confidence: f64,
    pub min_bound: f64,
    // Image selection
    pub image_extensions: Vec<String>,
    pub max_image_size_bytes: usize,
    pub metadata_suffix: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<WorkerConfig>);

impl Config {
    fn as_worker(&self) -> &WorkerConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_worker().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = WorkerConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_worker().validate()
    }

    pub fn environment(&self) -> &str {
        &self.as_worker().environment
    }

    pub fn verbose(&self) -> bool {
        self.as_worker().verbose
    }

    pub fn log_json(&self) -> bool {
        self.as_worker().log_json
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_worker().aws_region.as_deref()
    }

    pub fn sqs_queue_url(&self) -> Option<&str> {
        self.as_worker().sqs_queue_url.as_deref()
    }

    pub fn sqs_wait_time_seconds(&self) -> i32 {
        self.as_worker().sqs_wait_time_seconds
    }

    pub fn sqs_max_messages(&self) -> i32 {
        self.as_worker().sqs_max_messages
    }

    pub fn worker_max_concurrency(&self) -> usize {
        self.as_worker().worker_max_concurrency
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_worker().storage_backend
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_worker().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_worker().local_storage_path.as_deref()
    }

    pub fn min_confidence(&self) -> f64 {
        self.as_worker().min_confidence
    }

    pub fn min_bound(&self) -> f64 {
        self.as_worker().min_bound
    }

    pub fn image_extensions(&self) -> &[String] {
        &self.as_worker().image_extensions
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_worker().max_image_size_bytes
    }

    pub fn metadata_suffix(&self) -> &str {
        &self.as_worker().metadata_suffix
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let verbose = var("VERBOSE_MODE")
            .map(|v| v.trim().eq_ignore_ascii_case("verbose"))
            .unwrap_or(false);

        let log_json = var("LOG_FORMAT")
            .map(|v| v.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => Some(s.parse::<StorageBackend>()?),
            None => None,
        };

        let max_image_size_mb = var("MAX_IMAGE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let image_extensions = var("IMAGE_EXTENSIONS")
            .unwrap_or_else(|| IMAGE_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let min_confidence = match var("MIN_CONFIDENCE") {
            Some(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("MIN_CONFIDENCE must be a number"))?,
            None => MIN_CONFIDENCE,
        };

        let min_bound = match var("MIN_BOUND") {
            Some(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("MIN_BOUND must be a number"))?,
            None => MIN_BOUND,
        };

        Ok(WorkerConfig {
            environment,
            verbose,
            log_json,
            aws_region: var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")),
            sqs_queue_url: var("SQS_QUEUE_URL"),
            sqs_wait_time_seconds: var("SQS_WAIT_TIME_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SQS_WAIT_TIME_SECONDS),
            sqs_max_messages: var("SQS_MAX_MESSAGES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SQS_MAX_MESSAGES),
            worker_max_concurrency: var("WORKER_MAX_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(WORKER_MAX_CONCURRENCY),
            storage_backend,
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            min_confidence,
            min_bound,
            image_extensions,
            max_image_size_bytes: max_image_size_mb.saturating_mul(1024 * 1024),
            metadata_suffix: var("METADATA_SUFFIX").unwrap_or_else(|| METADATA_SUFFIX.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(anyhow::anyhow!(
                "MIN_CONFIDENCE must be between 0 and 100, got {}",
                self.min_confidence
            ));
        }

        if self.min_bound.is_nan() || self.min_bound < 0.0 {
            return Err(anyhow::anyhow!(
                "MIN_BOUND must be a non-negative fraction, got {}",
                self.min_bound
            ));
        }

        if !(0..=20).contains(&self.sqs_wait_time_seconds) {
            return Err(anyhow::anyhow!(
                "SQS_WAIT_TIME_SECONDS must be between 0 and 20"
            ));
        }

        if !(1..=10).contains(&self.sqs_max_messages) {
            return Err(anyhow::anyhow!("SQS_MAX_MESSAGES must be between 1 and 10"));
        }

        if self.worker_max_concurrency == 0 {
            return Err(anyhow::anyhow!("WORKER_MAX_CONCURRENCY must be at least 1"));
        }

        if self.image_extensions.is_empty() {
            return Err(anyhow::anyhow!("IMAGE_EXTENSIONS must list at least one extension"));
        }

        if self.metadata_suffix.is_empty() {
            return Err(anyhow::anyhow!("METADATA_SUFFIX must not be empty"));
        }

        // Validate storage backend configuration
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.aws_region.is_none() && self.s3_endpoint.is_none() {
                    return Err(anyhow::anyhow!(
                        "AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
