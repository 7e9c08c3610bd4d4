//! Escrow client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the escrow service or processing files.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// The server has no record of this identity, typically after a server-side reset.
    #[error("identity not known to server: {0}")]
    IdentityNotFound(String),

    #[error("no escrow record for identity {0}")]
    NoEscrowRecord(String),

    #[error("no identity available; encrypt something first")]
    NoIdentity,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] escrow_crypto::CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
