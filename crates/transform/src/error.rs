//! Errors raised when a step cannot be applied.

use thiserror::Error;

/// Errors that can occur when applying a step to a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The step touches positions outside the document.
    #[error("range {from}..{to} out of bounds for document of length {len}")]
    OutOfRange { from: usize, to: usize, len: usize },

    /// The step's end lies before its start.
    #[error("inverted range {from}..{to}")]
    InvertedRange { from: usize, to: usize },
}
