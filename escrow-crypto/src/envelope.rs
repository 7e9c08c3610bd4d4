//! Envelope encryption of session keys.
//!
//! A session key is wrapped with RSA under an identity's public key before it
//! is escrowed. Only the holder of the matching private key (the custodial
//! authority) can unwrap it.
//!
//! Public keys travel as SPKI PEM, private keys are stored as PKCS#8 PEM.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{KEY_SIZE, SessionKey};
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Modulus size for identity keypairs.
pub const RSA_KEY_BITS: usize = 2048;

/// RSA padding used to wrap session keys.
///
/// `Oaep` (SHA-256) is the default. `Pkcs1v15` matches what older clients
/// produced and is kept only for wire compatibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapScheme {
    #[default]
    Oaep,
    Pkcs1v15,
}

impl std::str::FromStr for WrapScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oaep" => Ok(Self::Oaep),
            "pkcs1v15" | "pkcs1" => Ok(Self::Pkcs1v15),
            other => Err(CryptoError::KeyEncoding(format!("unknown wrap scheme: {other}"))),
        }
    }
}

/// RSA keypair owned by one identity.
pub struct IdentityKeyPair {
    pub private: RsaPrivateKey,
    pub public: RsaPublicKey,
}

impl IdentityKeyPair {
    /// Generates a fresh 2048-bit keypair.
    pub fn generate() -> CryptoResult<Self> {
        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, RSA_KEY_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Restores a keypair from its PKCS#8 PEM private key.
    pub fn from_private_key_pem(pem: &str) -> CryptoResult<Self> {
        let private = parse_private_key_pem(pem)?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    pub fn public_key_pem(&self) -> CryptoResult<String> {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
    }

    /// PKCS#8 PEM of the private key, wiped from memory on drop.
    pub fn private_key_pem(&self) -> CryptoResult<Zeroizing<String>> {
        self.private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
    }
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

pub fn parse_public_key_pem(pem: &str) -> CryptoResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_pem(pem.trim())
        .map_err(|e| CryptoError::KeyEncoding(format!("public key: {e}")))
}

pub fn parse_private_key_pem(pem: &str) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem.trim())
        .map_err(|e| CryptoError::KeyEncoding(format!("private key: {e}")))
}

/// Wraps a session key under `recipient`.
///
/// Padding is randomized, so wrapping the same key twice yields different bytes.
pub fn wrap_key(
    key: &SessionKey,
    recipient: &RsaPublicKey,
    scheme: WrapScheme,
) -> CryptoResult<Vec<u8>> {
    let mut rng = rand::rngs::OsRng;
    let result = match scheme {
        WrapScheme::Oaep => recipient.encrypt(&mut rng, Oaep::new::<Sha256>(), key.as_bytes()),
        WrapScheme::Pkcs1v15 => recipient.encrypt(&mut rng, Pkcs1v15Encrypt, key.as_bytes()),
    };
    result.map_err(|e| CryptoError::Encryption(format!("key wrap failed: {e}")))
}

/// Unwraps a session key with the identity's private key.
///
/// Padding failures and unwrapped payloads that are not exactly 32 bytes both
/// surface as [`CryptoError::Unwrap`].
pub fn unwrap_key(
    wrapped: &[u8],
    private: &RsaPrivateKey,
    scheme: WrapScheme,
) -> CryptoResult<SessionKey> {
    let result = match scheme {
        WrapScheme::Oaep => private.decrypt(Oaep::new::<Sha256>(), wrapped),
        WrapScheme::Pkcs1v15 => private.decrypt(Pkcs1v15Encrypt, wrapped),
    };
    let raw = Zeroizing::new(
        result.map_err(|_| CryptoError::Unwrap("padding check failed".to_string()))?,
    );

    if raw.len() != KEY_SIZE {
        return Err(CryptoError::Unwrap(format!(
            "unwrapped key is {} bytes, expected {KEY_SIZE}",
            raw.len()
        )));
    }
    SessionKey::from_slice(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_parses_case_insensitively() {
        assert_eq!("OAEP".parse::<WrapScheme>().unwrap(), WrapScheme::Oaep);
        assert_eq!("pkcs1v15".parse::<WrapScheme>().unwrap(), WrapScheme::Pkcs1v15);
        assert!("rot13".parse::<WrapScheme>().is_err());
    }

    #[test]
    fn scheme_serde_names() {
        assert_eq!(serde_json::to_string(&WrapScheme::Oaep).unwrap(), "\"oaep\"");
        assert_eq!(
            serde_json::from_str::<WrapScheme>("\"pkcs1v15\"").unwrap(),
            WrapScheme::Pkcs1v15
        );
    }
}
