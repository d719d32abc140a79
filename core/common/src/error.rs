//! Common error types for usercrypt.

use thiserror::Error;

/// Top-level error type for usercrypt operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required configuration setting is absent.
    #[error("Missing configuration: {0} is not set")]
    MissingConfiguration(String),

    /// Encrypted data is malformed, truncated or foreign.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Authentication tag did not verify.
    ///
    /// Covers both tampered data and a wrong key. Carries no detail.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
