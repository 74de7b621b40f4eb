//! Core error types for Flarebar.

use thiserror::Error;

/// Core error type for Flarebar operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid data from an API response or persisted payload.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Secure storage failure (keychain or equivalent backend).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
