//! Identity error types.

use thiserror::Error;

/// Errors raised while persisting the local player identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identity file could not be read or written
    #[error("Identity storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The identity file could not be encoded
    #[error("Identity storage encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;
