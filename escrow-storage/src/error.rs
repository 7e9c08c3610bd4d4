//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    #[error("identity already exists: {0}")]
    DuplicateIdentity(String),

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("store is still shared by other handles")]
    StillShared,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
