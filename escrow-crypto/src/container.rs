//! On-disk layout of encrypted files.
//!
//! Three layouts exist:
//!
//! ```text
//! Raw        [iv:12][tag:16][ciphertext..]
//! Versioned  ["EKC"][version:1][iv:12][tag:16][ciphertext..]
//! LegacyText {"version":..,"algorithm":..,"iv":b64,"tag":b64,"timestamp":..}
//!            \n---ENCRYPTED_DATA---\n
//!            base64(ciphertext)
//! ```
//!
//! IV and tag lengths are protocol constants, so no length prefixes are needed.
//! New files are written `Versioned`; `Raw` is the canonical header-less form
//! and `LegacyText` exists only to read files from older clients.

use crate::cipher::{EncryptedData, IV_SIZE, LEGACY_IV_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Bytes that precede the ciphertext in the raw layout.
pub const HEADER_SIZE: usize = IV_SIZE + TAG_SIZE;

/// Marker that opens a versioned container.
pub const MAGIC: &[u8; 3] = b"EKC";

/// Current versioned container revision.
pub const FORMAT_VERSION: u8 = 1;

/// Separator line between the legacy JSON header and the base64 body.
pub const LEGACY_SEPARATOR: &str = "\n---ENCRYPTED_DATA---\n";

const LEGACY_ALGORITHM: &str = "AES-256-GCM";

/// Container layout selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    Raw,
    #[default]
    Versioned,
    LegacyText,
}

#[derive(Serialize, Deserialize)]
struct LegacyHeader {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    algorithm: Option<String>,
    iv: String,
    tag: String,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Encodes `iv || tag || ciphertext` in the canonical raw layout.
pub fn encode(iv: &[u8; IV_SIZE], tag: &[u8; TAG_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(tag);
    out.extend_from_slice(ciphertext);
    out
}

/// Splits a raw-layout container into its parts.
///
/// Fails with [`CryptoError::Malformed`] when fewer than [`HEADER_SIZE`] bytes
/// are present. The ciphertext may be empty.
pub fn decode(bytes: &[u8]) -> CryptoResult<EncryptedData> {
    if bytes.len() < HEADER_SIZE {
        return Err(CryptoError::Malformed(format!(
            "container is {} bytes, header needs {HEADER_SIZE}",
            bytes.len()
        )));
    }

    let (iv, rest) = bytes.split_at(IV_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag);

    Ok(EncryptedData {
        iv: iv.to_vec(),
        tag: tag_bytes,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Serializes sealed data in the requested layout.
pub fn encode_as(format: ContainerFormat, data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    match format {
        ContainerFormat::Raw => {
            let iv = canonical_iv(&data.iv)?;
            Ok(encode(&iv, &data.tag, &data.ciphertext))
        }
        ContainerFormat::Versioned => {
            let iv = canonical_iv(&data.iv)?;
            let mut out = Vec::with_capacity(MAGIC.len() + 1 + HEADER_SIZE + data.ciphertext.len());
            out.extend_from_slice(MAGIC);
            out.push(FORMAT_VERSION);
            out.extend_from_slice(&encode(&iv, &data.tag, &data.ciphertext));
            Ok(out)
        }
        ContainerFormat::LegacyText => encode_legacy(data),
    }
}

/// Parses bytes known to be in `format`.
pub fn decode_as(format: ContainerFormat, bytes: &[u8]) -> CryptoResult<EncryptedData> {
    match format {
        ContainerFormat::Raw => decode(bytes),
        ContainerFormat::Versioned => decode_versioned(bytes),
        ContainerFormat::LegacyText => decode_legacy(bytes),
    }
}

/// Best-effort layout detection.
///
/// A raw container whose IV happens to start with [`MAGIC`] is misread as
/// versioned; callers that know the layout should use [`decode_as`].
pub fn detect(bytes: &[u8]) -> ContainerFormat {
    if bytes.starts_with(MAGIC) {
        ContainerFormat::Versioned
    } else if find_separator(bytes).is_some() {
        ContainerFormat::LegacyText
    } else {
        ContainerFormat::Raw
    }
}

/// Detects the layout and decodes in one step.
pub fn decode_any(bytes: &[u8]) -> CryptoResult<(ContainerFormat, EncryptedData)> {
    let format = detect(bytes);
    decode_as(format, bytes).map(|data| (format, data))
}

fn canonical_iv(iv: &[u8]) -> CryptoResult<[u8; IV_SIZE]> {
    iv.try_into().map_err(|_| CryptoError::InvalidIvLength(iv.len()))
}

fn decode_versioned(bytes: &[u8]) -> CryptoResult<EncryptedData> {
    let prefix = MAGIC.len() + 1;
    if bytes.len() < prefix || !bytes.starts_with(MAGIC) {
        return Err(CryptoError::Malformed("missing container magic".into()));
    }
    match bytes[MAGIC.len()] {
        FORMAT_VERSION => decode(&bytes[prefix..]),
        other => Err(CryptoError::UnsupportedVersion(other)),
    }
}

fn find_separator(bytes: &[u8]) -> Option<usize> {
    let needle = LEGACY_SEPARATOR.as_bytes();
    bytes.windows(needle.len()).position(|w| w == needle)
}

fn encode_legacy(data: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let header = LegacyHeader {
        version: Some(serde_json::Value::from(1)),
        algorithm: Some(LEGACY_ALGORITHM.to_string()),
        iv: STANDARD.encode(&data.iv),
        tag: STANDARD.encode(data.tag),
        timestamp: Some(chrono::Utc::now().to_rfc3339()),
    };
    let header_json = serde_json::to_string(&header)
        .map_err(|e| CryptoError::Malformed(format!("legacy header: {e}")))?;

    let mut out = header_json.into_bytes();
    out.extend_from_slice(LEGACY_SEPARATOR.as_bytes());
    out.extend_from_slice(STANDARD.encode(&data.ciphertext).as_bytes());
    Ok(out)
}

fn decode_legacy(bytes: &[u8]) -> CryptoResult<EncryptedData> {
    let split = find_separator(bytes)
        .ok_or_else(|| CryptoError::Malformed("legacy separator not found".into()))?;
    let header_bytes = &bytes[..split];
    let body = &bytes[split + LEGACY_SEPARATOR.len()..];

    let header: LegacyHeader = serde_json::from_slice(header_bytes)
        .map_err(|e| CryptoError::Malformed(format!("corrupted legacy header: {e}")))?;

    let iv = STANDARD
        .decode(header.iv.trim())
        .map_err(|e| CryptoError::Malformed(format!("legacy iv: {e}")))?;
    if iv.len() != IV_SIZE && iv.len() != LEGACY_IV_SIZE {
        return Err(CryptoError::Malformed(format!(
            "legacy iv is {} bytes",
            iv.len()
        )));
    }

    let tag = STANDARD
        .decode(header.tag.trim())
        .map_err(|e| CryptoError::Malformed(format!("legacy tag: {e}")))?;
    let tag: [u8; TAG_SIZE] = tag
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::Malformed(format!("legacy tag is {} bytes", tag.len())))?;

    let body = std::str::from_utf8(body)
        .map_err(|_| CryptoError::Malformed("legacy body is not text".into()))?;
    let ciphertext = STANDARD
        .decode(body.trim())
        .map_err(|e| CryptoError::Malformed(format!("legacy body: {e}")))?;

    Ok(EncryptedData { iv, tag, ciphertext })
}
