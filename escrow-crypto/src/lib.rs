//! Cryptographic core for the key escrow protocol.
//!
//! Provides the three primitives the escrow flow is built from:
//! - AES-256-GCM session encryption with a fresh random IV per call
//! - File containers that lay out `iv || tag || ciphertext` on disk
//! - RSA-2048 key wrapping of the 32-byte session key under an identity's public key
//!
//! # Architecture
//!
//! The escrow protocol uses envelope encryption:
//!
//! 1. **Session Key**: A random 256-bit key generated client-side for one
//!    encryption session. It never leaves process memory in the clear.
//!
//! 2. **Identity Keypair**: An RSA keypair issued by the custodial authority.
//!    The session key is wrapped under the public half and escrowed; only the
//!    authority, holding the private half, can unwrap it again.
//!
//! Each file is sealed independently, so a damaged container only costs that
//! one file.

mod cipher;
pub mod container;
pub mod envelope;
mod error;
mod key;

pub use cipher::{EncryptedData, IV_SIZE, LEGACY_IV_SIZE, TAG_SIZE, decrypt, encrypt};
pub use container::{ContainerFormat, HEADER_SIZE, decode, encode};
pub use envelope::{IdentityKeyPair, RSA_KEY_BITS, WrapScheme, unwrap_key, wrap_key};
pub use error::{CryptoError, CryptoResult};
pub use key::{KEY_SIZE, SessionKey, generate_session_key};
