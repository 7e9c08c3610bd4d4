//! Escrow domain services.
//!
//! Each service is independent of the HTTP layer and talks to storage through
//! the repository traits, so the same services back both the REST handlers
//! and the operator commands in the binary.
//!
//! ## Services
//!
//! - **authority** - issues RSA identities and hands out public keys
//! - **escrow** - appends wrapped session keys for known identities
//! - **recovery** - unwraps the latest escrowed key with the identity's private key
//!
//! RSA and SQLite calls block, so every service runs them on
//! `tokio::task::spawn_blocking`.

mod authority;
mod escrow;
mod recovery;

pub use authority::{IdentityAuthority, IssuedIdentity};
pub use escrow::KeyEscrow;
pub use recovery::RecoveryService;
