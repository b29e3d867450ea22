//! Common error types for PassVault.

use thiserror::Error;

/// Top-level error type for PassVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Cryptographic operation failed (sealing, key derivation, hashing).
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// A sealed field could not be opened: malformed envelope or wrong key.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Required configuration is missing or invalid. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing, invalid or expired credential.
    ///
    /// Carries no detail so callers cannot tell which check failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
