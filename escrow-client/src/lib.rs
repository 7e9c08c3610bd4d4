//! Client side of the key escrow protocol.
//!
//! Provides:
//! - An HTTP client for the escrow service
//! - A cached identity session that re-acquires an identity when the server
//!   no longer knows it
//! - Bulk file encryption that escrows the session key before any file is
//!   modified, plus the matching decrypt and recover passes

pub mod api_client;
pub mod batch;
pub mod config;
pub mod error;
pub mod identity;
pub mod types;

pub use api_client::EscrowApiClient;
pub use batch::{BatchProcessor, BatchReport, EncryptionOutcome, FileFailure, StopFlag};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use identity::IdentitySession;
pub use types::IdentityInfo;
