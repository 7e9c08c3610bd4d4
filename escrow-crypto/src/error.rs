//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing, opening, wrapping or encoding.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid IV length: {0} bytes")]
    InvalidIvLength(usize),

    #[error("malformed container: {0}")]
    Malformed(String),

    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u8),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("authentication failed (wrong key or tampered data)")]
    Authentication,

    #[error("key unwrap failed: {0}")]
    Unwrap(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key encoding error: {0}")]
    KeyEncoding(String),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}
