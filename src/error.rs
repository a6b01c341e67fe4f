//! Error types for interlace

use thiserror::Error;

/// Errors that can occur while adapting producer payloads or encoding output.
///
/// Fusion itself never errors: missing timing data and empty windows are
/// silent degradations, not failures.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Failed to parse producer payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid speech anchor: {0}")]
    InvalidAnchor(String),

    #[error("Invalid sensor frame: {0}")]
    InvalidFrame(String),
}
