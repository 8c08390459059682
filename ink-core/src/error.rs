//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// The stroke model itself never fails; these cover parsing and
/// construction of values that arrive from outside (stroke files, hex
/// colors typed by a user).
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A color string was not valid hex.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A stroke could not be constructed.
    #[error("Invalid stroke: {0}")]
    InvalidStroke(String),

    /// Stroke serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
