//! SQS poller: long-poll, bounded concurrent handling, delete after handling.
//!
//! Shutdown: once the shutdown future resolves the poller stops receiving and
//! waits for in-flight messages to finish before returning. Messages are
//! deleted after every record in them was attempted; a failed record is
//! logged, never retried here.

use anyhow::{Context, Result};
use aws_sdk_sqs::types::Message;
use aws_sdk_sqs::Client as SqsClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use picmeta_core::Config;

use crate::event::parse_notification;
use crate::handler::{log_failure, ImageHandler, Outcome};

/// Delay before polling again after a failed `ReceiveMessage`
pub const RECEIVE_ERROR_BACKOFF_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub queue_url: String,
    pub wait_time_seconds: i32,
    pub max_messages: i32,
    pub max_concurrency: usize,
}

impl QueueConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let queue_url = config
            .sqs_queue_url()
            .context("SQS_QUEUE_URL must be set to poll a queue")?
            .to_string();

        Ok(Self {
            queue_url,
            wait_time_seconds: config.sqs_wait_time_seconds(),
            max_messages: config.sqs_max_messages(),
            max_concurrency: config.worker_max_concurrency(),
        })
    }
}

/// Counts for one message body
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MessageReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Handle every record of one notification body.
///
/// Returns `None` when the body is not an S3 notification at all.
pub async fn handle_body(handler: &ImageHandler, body: &str) -> Option<MessageReport> {
    let locations = match parse_notification(body) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::warn!(error = %e, "Message body is not an S3 event notification");
            return None;
        }
    };

    let mut report = MessageReport::default();
    for location in &locations {
        match handler.handle(location).await {
            Ok(Outcome::Processed { .. }) => report.processed += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(e) => {
                log_failure(location, &e);
                report.failed += 1;
            }
        }
    }

    Some(report)
}

pub struct SqsPoller {
    client: SqsClient,
    config: QueueConfig,
    handler: Arc<ImageHandler>,
}

impl SqsPoller {
    pub fn new(client: SqsClient, config: QueueConfig, handler: Arc<ImageHandler>) -> Self {
        Self {
            client,
            config,
            handler,
        }
    }

    /// Poll until `shutdown` resolves, then drain in-flight messages.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            queue_url = %self.config.queue_url,
            max_concurrency = self.config.max_concurrency,
            wait_time_seconds = self.config.wait_time_seconds,
            "SQS poller started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("SQS poller shutting down");
                    break;
                }
                received = self.receive() => {
                    match received {
                        Ok(messages) => {
                            for message in messages {
                                let permit = semaphore
                                    .clone()
                                    .acquire_owned()
                                    .await
                                    .context("Worker semaphore closed")?;
                                let client = self.client.clone();
                                let queue_url = self.config.queue_url.clone();
                                let handler = self.handler.clone();

                                tokio::spawn(async move {
                                    let _permit = permit;
                                    Self::process_message(&client, &queue_url, &handler, message).await;
                                });
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %format!("{:#}", e), "Failed to receive messages");
                            sleep(Duration::from_secs(RECEIVE_ERROR_BACKOFF_SECS)).await;
                        }
                    }
                }
            }
        }

        // Every permit back means every spawned handler finished
        let _drained = semaphore
            .acquire_many(self.config.max_concurrency as u32)
            .await
            .context("Worker semaphore closed")?;

        tracing::info!("SQS poller stopped");
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.max_messages)
            .wait_time_seconds(self.config.wait_time_seconds)
            .send()
            .await
            .context("ReceiveMessage failed")?;

        let messages = output.messages().to_vec();
        if !messages.is_empty() {
            tracing::debug!(count = messages.len(), "Received messages");
        }
        Ok(messages)
    }

    #[tracing::instrument(skip_all, fields(message_id = message.message_id().unwrap_or("-")))]
    async fn process_message(
        client: &SqsClient,
        queue_url: &str,
        handler: &ImageHandler,
        message: Message,
    ) {
        match message.body() {
            Some(body) => {
                if let Some(report) = handle_body(handler, body).await {
                    tracing::debug!(
                        processed = report.processed,
                        skipped = report.skipped,
                        failed = report.failed,
                        "Message handled"
                    );
                }
            }
            None => tracing::warn!("Message without body"),
        }

        let Some(receipt_handle) = message.receipt_handle() else {
            tracing::warn!("Message without receipt handle, cannot delete");
            return;
        };

        if let Err(e) = client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
        {
            tracing::error!(error = %e, "Failed to delete message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picmeta_core::WorkerConfig;

    #[test]
    fn test_queue_config_requires_url() {
        let config = Config(Box::new(WorkerConfig::from_vars(|_| None).unwrap()));
        assert!(QueueConfig::from_config(&config).is_err());
    }

    #[test]
    fn test_queue_config_from_config() {
        let config = Config(Box::new(
            WorkerConfig::from_vars(|key| match key {
                "SQS_QUEUE_URL" => Some("https://sqs.eu-west-1.amazonaws.com/1/images".to_string()),
                "SQS_MAX_MESSAGES" => Some("5".to_string()),
                "WORKER_MAX_CONCURRENCY" => Some("2".to_string()),
                _ => None,
            })
            .unwrap(),
        ));

        let queue = QueueConfig::from_config(&config).unwrap();

        assert_eq!(queue.max_messages, 5);
        assert_eq!(queue.max_concurrency, 2);
        assert_eq!(queue.wait_time_seconds, 20);
    }
}
