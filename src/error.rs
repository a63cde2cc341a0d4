//! Error types for history tracking.

use thiserror::Error;
use transform::StepError;

/// Errors that can occur while tracking or rewriting history.
#[derive(Error, Debug)]
pub enum TrackError {
    /// A history rewrite was requested while the head commit has open steps.
    #[error("uncommitted changes present")]
    UncommittedChanges,

    /// A transform was built against a document other than the current one.
    #[error("transform does not start from the current document")]
    StaleTransform,

    /// A step could not be applied.
    #[error("step failed: {0}")]
    Step(#[from] StepError),

    /// The payload is not valid JSON or does not match the expected shape.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was written by an unknown format version.
    #[error("unsupported history version {0}")]
    UnsupportedVersion(u32),

    /// The payload digest does not match its contents.
    #[error("history digest mismatch")]
    DigestMismatch,

    /// The payload is well-formed JSON but not a valid history.
    #[error("malformed history: {0}")]
    Malformed(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
