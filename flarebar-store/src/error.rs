//! Store error types.

use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Secret backend failure.
    #[error("Secret store error: {0}")]
    Secret(String),
}

impl From<flarebar_core::CoreError> for StoreError {
    fn from(err: flarebar_core::CoreError) -> Self {
        StoreError::Secret(err.to_string())
    }
}
