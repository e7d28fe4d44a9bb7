//! Error types for proctor-risk
//!
//! The scoring core is total and never fails; these errors only surface at the
//! I/O boundary (parsing event logs, loading configuration, encoding reports).

use thiserror::Error;

/// Errors that can occur around an assessment
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Failed to parse event log: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid analyzer configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
