//! Error types for loading collections.

use std::path::PathBuf;

use thiserror::Error;

/// Errors a [`CollectionSource`](crate::CollectionSource) can report.
///
/// None of these abort a refresh; the store turns them into notifications.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload parsed but is not a list of records.
    #[error("unexpected payload from {origin}: {detail}")]
    UnexpectedShape { origin: String, detail: String },
}

impl SourceError {
    pub fn unexpected_shape(origin: impl Into<String>, detail: impl Into<String>) -> Self {
        SourceError::UnexpectedShape {
            origin: origin.into(),
            detail: detail.into(),
        }
    }
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
