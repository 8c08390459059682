//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A surface was requested with a zero or oversized dimension.
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A stroke path could not be built.
    #[error("Path construction failed: {0}")]
    Path(String),

    /// PNG encoding failed.
    #[error("Image encoding failed: {0}")]
    Encode(String),
}
