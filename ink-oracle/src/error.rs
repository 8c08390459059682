//! Oracle and session error types.

use ink_renderer::RenderError;
use thiserror::Error;

/// Result type for interpretation service calls.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors that can occur when talking to the interpretation service.
#[derive(Debug, Error)]
pub enum OracleError {
    /// No API key configured; nothing was sent.
    #[error("missing Gemini API key (set GEMINI_API_KEY)")]
    MissingCredential,
    /// The configured base URL is invalid.
    #[error("invalid Gemini URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, TLS, body read).
    #[error("Gemini HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("Gemini returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The response or the generated JSON could not be parsed.
    #[error("failed to parse Gemini payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The response carried no generated text.
    #[error("Gemini returned no content")]
    EmptyResponse,
    /// The call did not finish within the configured timeout.
    #[error("Gemini request timed out")]
    Timeout,
}

impl OracleError {
    /// Returns true if retrying the same request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Errors from the reading flow.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nothing has been drawn yet.
    #[error("canvas is empty")]
    EmptyCanvas,
    /// A submission is already being processed.
    #[error("canvas is locked while a reading is in progress")]
    Locked,
    /// The drawing could not be exported.
    #[error("failed to export drawing: {0}")]
    Render(#[from] RenderError),
    /// Every position of the spread already has a card.
    #[error("all {0} cards of the spread have been drawn")]
    SpreadComplete(usize),
    /// The reading cannot be saved before every position is drawn.
    #[error("reading incomplete: {drawn} of {expected} cards drawn")]
    Incomplete {
        /// Cards drawn so far.
        drawn: usize,
        /// Cards in the spread.
        expected: usize,
    },
}
