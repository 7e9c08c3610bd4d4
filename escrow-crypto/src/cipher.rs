//! AES-256-GCM session encryption.
//!
//! Every call to [`encrypt`] draws a fresh 12-byte IV from the OS CSPRNG, so
//! two encryptions of the same plaintext under the same key never share a
//! nonce. The 16-byte tag is kept detached so containers can place it at a
//! fixed offset.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SessionKey;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{Aes256Gcm, AesGcm};
use rand::RngCore;

/// IV size written by [`encrypt`].
pub const IV_SIZE: usize = 12;
/// IV size produced by older text-format clients.
pub const LEGACY_IV_SIZE: usize = 16;
/// GCM authentication tag size.
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM with a 16-byte nonce, as emitted by legacy clients.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// One sealed payload: nonce, detached tag and ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    /// Nonce, [`IV_SIZE`] bytes for anything this crate produces.
    pub iv: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
    /// Same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

/// Encrypts `plaintext` under `key` with a freshly generated IV.
pub fn encrypt(key: &SessionKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(EncryptedData {
        iv: iv.to_vec(),
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypts and authenticates `data` under `key`.
///
/// Returns [`CryptoError::Authentication`] on any tag mismatch; no plaintext
/// is released in that case.
pub fn decrypt(key: &SessionKey, data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let mut buffer = data.ciphertext.clone();
    let tag = GenericArray::from_slice(&data.tag);

    let result = match data.iv.len() {
        IV_SIZE => Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|_| CryptoError::Authentication)?
            .decrypt_in_place_detached(GenericArray::from_slice(&data.iv), b"", &mut buffer, tag),
        LEGACY_IV_SIZE => Aes256Gcm16::new_from_slice(key.as_bytes())
            .map_err(|_| CryptoError::Authentication)?
            .decrypt_in_place_detached(GenericArray::from_slice(&data.iv), b"", &mut buffer, tag),
        other => return Err(CryptoError::InvalidIvLength(other)),
    };

    result.map_err(|_| CryptoError::Authentication)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::generate_session_key;

    #[test]
    fn round_trip() {
        let key = generate_session_key();
        let sealed = encrypt(&key, b"quarterly-report.xlsx contents").unwrap();
        assert_eq!(sealed.iv.len(), IV_SIZE);
        assert_eq!(
            decrypt(&key, &sealed).unwrap(),
            b"quarterly-report.xlsx contents"
        );
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let key = generate_session_key();
        let sealed = encrypt(&key, b"").unwrap();
        assert!(sealed.ciphertext.is_empty());
        assert!(decrypt(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn fresh_iv_per_call() {
        let key = generate_session_key();
        let a = encrypt(&key, b"same input").unwrap();
        let b = encrypt(&key, b"same input").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails_closed() {
        let sealed = encrypt(&generate_session_key(), b"secret").unwrap();
        let err = decrypt(&generate_session_key(), &sealed).unwrap_err();
        assert!(matches!(err, CryptoError::Authentication));
    }

    #[test]
    fn odd_iv_length_rejected() {
        let key = generate_session_key();
        let mut sealed = encrypt(&key, b"x").unwrap();
        sealed.iv.truncate(8);
        assert!(matches!(
            decrypt(&key, &sealed),
            Err(CryptoError::InvalidIvLength(8))
        ));
    }

    #[test]
    fn legacy_sixteen_byte_iv_decrypts() {
        let key = generate_session_key();
        let iv = [7u8; LEGACY_IV_SIZE];
        let mut buffer = b"from an older client".to_vec();
        let tag = Aes256Gcm16::new_from_slice(key.as_bytes())
            .unwrap()
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
            .unwrap();

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(&tag);
        let sealed = EncryptedData {
            iv: iv.to_vec(),
            tag: tag_bytes,
            ciphertext: buffer,
        };
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"from an older client");
    }
}
