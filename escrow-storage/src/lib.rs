//! SQLite storage layer for the key escrow service.
//!
//! Provides durable storage for issued identities and the wrapped session
//! keys escrowed against them.
//!
//! # Architecture
//!
//! - Persistence sits behind two repository traits, [`IdentityStore`] and
//!   [`EscrowStore`], so services can be handed any backend
//! - [`SqliteStore`] implements both over a single serialized connection
//! - Escrow records are append-only; "current" means highest insertion id
//! - The schema is created on open; there is no separate migration step

mod error;
mod escrow_store;
mod identity_store;
mod models;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use models::{EscrowRecord, Identity, NewEscrowRecord};
pub use sqlite::SqliteStore;

use zeroize::Zeroizing;

/// Persistence for custodial identities.
///
/// Identities are immutable once inserted and are never deleted.
pub trait IdentityStore: Send + Sync {
    /// Inserts a new identity. An existing id is an error, never an upsert.
    fn insert_identity(&self, identity: &Identity) -> StorageResult<()>;

    fn get_identity(&self, identity_id: &str) -> StorageResult<Option<Identity>>;

    fn get_public_key(&self, identity_id: &str) -> StorageResult<Option<String>>;

    /// Private key PEM. Only the recovery path should call this.
    fn get_private_key(&self, identity_id: &str) -> StorageResult<Option<Zeroizing<String>>>;

    fn identity_count(&self) -> StorageResult<u64>;
}

/// Append-only persistence for escrowed wrapped keys.
pub trait EscrowStore: Send + Sync {
    /// Appends a record after checking the identity exists.
    ///
    /// The existence check and the insert happen in one transaction; an
    /// unknown identity yields [`StorageError::IdentityNotFound`] and writes
    /// nothing.
    fn store_wrapped_key(&self, record: NewEscrowRecord) -> StorageResult<EscrowRecord>;

    /// The most recently inserted record for an identity.
    fn latest_for_identity(&self, identity_id: &str) -> StorageResult<Option<EscrowRecord>>;

    /// Newest records across all identities, newest first.
    fn list_recent(&self, limit: usize) -> StorageResult<Vec<EscrowRecord>>;

    fn count_for_identity(&self, identity_id: &str) -> StorageResult<u64>;
}
