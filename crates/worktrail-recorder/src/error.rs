//! Error types for the recorder.

use thiserror::Error;

/// Result type alias for recorder operations.
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Errors raised while configuring a recorder.
///
/// Event handling itself never fails; malformed events are absorbed.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Invalid ignore pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
