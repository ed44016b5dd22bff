//! S3 event notifications delivered through SQS

use picmeta_storage::ObjectLocation;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct S3Event {
    /// Absent for `s3:TestEvent` bodies
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub s3: Option<S3Entity>,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    /// URL-encoded, `+` for space
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Decode an object key as it appears in an event notification
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!(key = raw, error = %e, "Object key is not valid UTF-8 after decoding");
            spaced
        }
    }
}

/// Parse a message body into the object locations it refers to.
/// Records without an `s3` entity are skipped.
pub fn parse_notification(body: &str) -> serde_json::Result<Vec<ObjectLocation>> {
    let event: S3Event = serde_json::from_str(body)?;

    Ok(event
        .records
        .into_iter()
        .filter_map(|record| {
            let Some(s3) = record.s3 else {
                tracing::debug!(event_name = ?record.event_name, "Ignoring record without s3 entity");
                return None;
            };
            Some(ObjectLocation::new(s3.bucket.name, decode_key(&s3.object.key)))
        })
        .collect())
}
