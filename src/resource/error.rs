//! Errors surfaced by the resource layer

use crate::instana::error::RestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// A REST call failed
    #[error(transparent)]
    Rest(#[from] RestError),

    /// A state field does not have the shape its schema declares
    #[error("field '{field}' has an unexpected shape: {message}")]
    Schema { field: String, message: String },

    /// The user configuration was rejected at plan time
    #[error("invalid configuration for {resource}: {}", .diagnostics.join("; "))]
    InvalidConfig {
        resource: String,
        diagnostics: Vec<String>,
    },

    /// A state upgrader could not migrate the persisted state
    #[error("failed to upgrade {resource} state from schema version {from}: {message}")]
    Upgrade {
        resource: String,
        from: u32,
        message: String,
    },

    /// A resource handle was declared inconsistently
    #[error("invalid resource handle {resource}: {message}")]
    InvalidHandle { resource: String, message: String },

    /// The API returned an object of a different flavour than the handle manages
    #[error("expected a {expected} object but the API returned {actual}")]
    KindMismatch { expected: String, actual: String },

    /// Update was requested for a resource that was never persisted
    #[error("{resource} has no id; it must be created before it can be updated")]
    MissingId { resource: String },

    #[error("unknown resource type: {0}")]
    UnknownResource(String),
}

impl ProviderError {
    pub(crate) fn schema(field: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
