use thiserror::Error;

/// Scoring errors
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    /// A detection record lacks a field the scorer needs.
    /// Scoring skips the record and carries on with the rest.
    #[error("Malformed detection: {0}")]
    MalformedDetection(String),

    /// Thresholds outside their contract (caller bug)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;
