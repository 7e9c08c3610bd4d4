//! Ephemeral symmetric session keys.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a session key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// A 256-bit session key held only in process memory.
///
/// The key bytes are wiped when the value is dropped. Only the base64 or
/// wrapped form is ever meant to cross a process boundary.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_SIZE],
    #[zeroize(skip)]
    created_at: DateTime<Utc>,
}

impl SessionKey {
    /// Wraps existing key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            bytes,
            created_at: Utc::now(),
        }
    }

    /// Builds a key from a slice, rejecting anything that is not exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; KEY_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self::from_bytes(array))
    }

    /// Decodes a key from standard base64.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let mut decoded = STANDARD.decode(encoded.trim())?;
        let key = Self::from_slice(&decoded);
        decoded.zeroize();
        key
    }

    /// Encodes the raw key as standard base64 for transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for SessionKey {}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Generates a fresh session key from the OS CSPRNG.
pub fn generate_session_key() -> SessionKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SessionKey::from_bytes(bytes)
}
