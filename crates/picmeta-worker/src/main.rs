//! picmeta-worker: image metadata sidecar worker.
//!
//! Configuration comes from the environment (and `.env`); see `picmeta_core::Config`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use picmeta_core::Config;
use picmeta_infra::{init_telemetry, shutdown_telemetry, TelemetryOptions};
use picmeta_storage::{create_storage, ObjectLocation};
use picmeta_vision::{
    score_labels, score_texts, LabelDetection, RekognitionDetector, ScoreMap, TextDetection,
};
use picmeta_worker::{HandlerSettings, ImageHandler, Outcome, QueueConfig, SqsPoller};

#[derive(Parser)]
#[command(name = "picmeta-worker", about = "Image metadata sidecar worker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the configured SQS queue until interrupted
    Run,
    /// Process a single object and exit
    Process {
        /// Bucket holding the image
        #[arg(long)]
        bucket: String,
        /// Object key of the image
        #[arg(long)]
        key: String,
    },
    /// Score saved detection results (DetectLabels / DetectText JSON)
    Score {
        /// File with label detections
        #[arg(long)]
        labels: Option<PathBuf>,
        /// File with text detections
        #[arg(long)]
        texts: Option<PathBuf>,
        /// Overrides MIN_CONFIDENCE
        #[arg(long)]
        min_confidence: Option<f64>,
        /// Overrides MIN_BOUND
        #[arg(long)]
        min_bound: Option<f64>,
    },
}

#[derive(Serialize)]
struct Scores {
    labels: ScoreMap,
    texts: ScoreMap,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Read detections from a file holding either a bare array or a full API
/// response with the array under `field`.
fn load_detections<T: DeserializeOwned>(path: &Path, field: &str) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    if let Some(inner) = value.get_mut(field) {
        value = inner.take();
    }

    serde_json::from_value(value)
        .with_context(|| format!("{} does not hold a list of detections", path.display()))
}

async fn build_handler(config: &Config) -> Result<Arc<ImageHandler>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;
    let detector = RekognitionDetector::new(config.aws_region().map(String::from)).await;

    let handler = ImageHandler::new(
        storage,
        Arc::new(detector),
        HandlerSettings::from_config(config),
    )?;
    Ok(Arc::new(handler))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_telemetry(TelemetryOptions {
        verbose: config.verbose(),
        json: config.log_json(),
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = config.environment(),
        production = config.is_production(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Run => {
            config.validate()?;
            let queue = QueueConfig::from_config(&config)?;
            let handler = build_handler(&config).await?;

            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = config.aws_region() {
                loader = loader.region(aws_config::Region::new(region.to_string()));
            }
            let client = aws_sdk_sqs::Client::new(&loader.load().await);

            SqsPoller::new(client, queue, handler)
                .run(shutdown_signal())
                .await?;
        }
        Commands::Process { bucket, key } => {
            config.validate()?;
            let handler = build_handler(&config).await?;
            let location = ObjectLocation::new(bucket, key);

            match handler.process(&location).await? {
                Outcome::Processed { metadata, url, .. } => {
                    tracing::info!(metadata = %metadata, "Metadata written");
                    println!("{}", url);
                }
                Outcome::Skipped => tracing::info!(location = %location, "Nothing to do"),
            }
        }
        Commands::Score {
            labels,
            texts,
            min_confidence,
            min_bound,
        } => {
            let min_confidence = min_confidence.unwrap_or(config.min_confidence());
            let min_bound = min_bound.unwrap_or(config.min_bound());

            let label_records: Vec<LabelDetection> = match labels {
                Some(path) => load_detections(&path, "Labels")?,
                None => Vec::new(),
            };
            let text_records: Vec<TextDetection> = match texts {
                Some(path) => load_detections(&path, "TextDetections")?,
                None => Vec::new(),
            };

            print_json(&Scores {
                labels: score_labels(&label_records, min_confidence, min_bound)?,
                texts: score_texts(&text_records, min_confidence, min_bound)?,
            })?;
        }
    }

    shutdown_telemetry().await;
    Ok(())
}
