//! Store error types.

use thiserror::Error;

/// Errors raised by a key-path store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The path cannot be addressed by this store
    #[error("Invalid store path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The backing service refused or dropped the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized to prevent information disclosure about
    /// the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::Database(_) => "Internal server error".to_string(),
            StoreError::Serialization(_) => "Stored data is malformed".to_string(),
            StoreError::Unavailable(_) => "Storage temporarily unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
