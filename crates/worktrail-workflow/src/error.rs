//! Error types for workflow synthesis and lookup.

use std::path::PathBuf;

use thiserror::Error;
use worktrail_llm::LlmError;

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors from narration, naming, or workflow lookup.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
