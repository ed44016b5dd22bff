//! Picmeta Worker
//!
//! Consumes S3 event notifications from SQS and writes a metadata sidecar
//! (`<key>--metadata.json`) next to every new image.

pub mod event;
pub mod filter;
pub mod handler;
pub mod queue;

pub use event::{decode_key, parse_notification};
pub use filter::ImageFilter;
pub use handler::{HandlerSettings, ImageHandler, Outcome};
pub use queue::{handle_body, MessageReport, QueueConfig, SqsPoller};
