//! Errors surfaced by the Instana REST layer

use thiserror::Error;

/// Failure of a single REST call.
///
/// Remote messages are kept verbatim so they can be shown to the operator
/// unchanged.
#[derive(Debug, Error)]
pub enum RestError {
    /// The requested object does not exist (HTTP 404)
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// The API rejected the payload (HTTP 400, 409, 422)
    #[error("request rejected with status {status}: {message}")]
    Validation { status: u16, message: String },

    /// Connection problems and every other non-success status
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected type
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The configured endpoint is not a usable base URL
    #[error("invalid Instana endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl RestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the REST layer may retry the request that produced this error
    pub(crate) fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
