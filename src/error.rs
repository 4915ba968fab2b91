//! Error types for the workday engine

use thiserror::Error;

/// Errors that can occur while processing an activity batch
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
