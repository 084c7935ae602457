//! Error types for Classense

use thiserror::Error;

/// Errors that can occur at the engine boundary
///
/// Expected data conditions (absent keypoints, empty sequences, zero-length
/// windows) are modeled as values, not errors. Only contract violations in
/// the input (malformed JSON, wrong keypoint arity, non-monotonic timestamps)
/// surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse pose sequence: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid pose sequence: {0}")]
    InvalidSequence(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
