//! Bulk file encryption and decryption.
//!
//! `encrypt_files` runs the escrow handshake first and only then touches
//! files: if the wrapped session key cannot be escrowed, nothing on disk
//! changes. Files are processed one at a time. A failing file is recorded in
//! the [`BatchReport`] and the pass moves on; a [`StopFlag`] is checked before
//! each file.

use crate::api_client::EscrowApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::identity::IdentitySession;
use escrow_crypto::container::{decode_as, detect, encode_as};
use escrow_crypto::{
    ContainerFormat, CryptoError, SessionKey, WrapScheme, decrypt, encrypt, generate_session_key,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Cooperative cancellation shared between a batch and its controller.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the running batch stop before its next file.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-file results of one pass.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    /// Files left alone because they were not containers.
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    /// Set when the pass ended early on a [`StopFlag`].
    pub cancelled: bool,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    fn record_failure(&mut self, path: &Path, error: ClientError) {
        warn!("failed to process {}: {error}", path.display());
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            error: error.to_string(),
        });
    }
}

/// Result of an encryption pass.
#[derive(Debug)]
pub struct EncryptionOutcome {
    /// Identity the session key was escrowed under.
    pub identity_id: String,
    pub report: BatchReport,
    /// The session key the files were sealed with. The caller decides whether to keep it.
    pub session_key: SessionKey,
}

enum DecryptStatus {
    Decrypted,
    NotAContainer,
}

pub struct BatchProcessor {
    api: EscrowApiClient,
    session: IdentitySession,
    format: ContainerFormat,
    scheme: WrapScheme,
}

impl BatchProcessor {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let api = EscrowApiClient::new(config)?;
        let session = IdentitySession::new(api.clone(), config.identity_cache_path.clone());
        Ok(Self {
            api,
            session,
            format: config.container_format,
            scheme: config.wrap_scheme,
        })
    }

    pub fn session(&self) -> &IdentitySession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut IdentitySession {
        &mut self.session
    }

    /// Escrows a fresh session key, then seals each file in place.
    ///
    /// Errors from the escrow handshake abort the pass before any file is
    /// read. Per-file errors end up in the report.
    pub async fn encrypt_files(
        &mut self,
        paths: &[PathBuf],
        stop: &StopFlag,
    ) -> ClientResult<EncryptionOutcome> {
        let session_key = generate_session_key();
        let files_count = u32::try_from(paths.len()).unwrap_or(u32::MAX);
        let identity = self
            .session
            .escrow_session_key(&session_key, files_count, self.scheme)
            .await?;

        let mut report = BatchReport::default();
        for path in paths {
            if stop.is_stopped() {
                report.cancelled = true;
                break;
            }
            match self.encrypt_file(path, &session_key).await {
                Ok(()) => report.processed += 1,
                Err(e) => report.record_failure(path, e),
            }
        }

        info!(
            identity_id = %identity.identity_id,
            processed = report.processed,
            failed = report.failed(),
            cancelled = report.cancelled,
            "encryption pass finished"
        );

        Ok(EncryptionOutcome {
            identity_id: identity.identity_id,
            report,
            session_key,
        })
    }

    /// Opens each container with `key` and writes the plaintext back in place.
    ///
    /// Files that are not containers are skipped. A file that fails
    /// authentication is reported and left unchanged. The configured layout
    /// takes precedence over detection.
    pub async fn decrypt_files(
        &self,
        paths: &[PathBuf],
        key: &SessionKey,
        stop: &StopFlag,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            if stop.is_stopped() {
                report.cancelled = true;
                break;
            }
            match decrypt_file(path, key, self.format).await {
                Ok(DecryptStatus::Decrypted) => report.processed += 1,
                Ok(DecryptStatus::NotAContainer) => {
                    debug!("skipping {}: not an encrypted container", path.display());
                    report.skipped += 1;
                }
                Err(e) => report.record_failure(path, e),
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed(),
            cancelled = report.cancelled,
            "decryption pass finished"
        );
        report
    }

    /// Recovers the session key for the session identity, then decrypts.
    pub async fn recover_and_decrypt(
        &mut self,
        paths: &[PathBuf],
        stop: &StopFlag,
    ) -> ClientResult<BatchReport> {
        let identity = self
            .session
            .cached_identity()
            .await?
            .ok_or(ClientError::NoIdentity)?;
        let key = self.api.recover(&identity.identity_id).await?;
        Ok(self.decrypt_files(paths, &key, stop).await)
    }

    async fn encrypt_file(&self, path: &Path, key: &SessionKey) -> ClientResult<()> {
        let plaintext = tokio::fs::read(path).await?;
        let sealed = encrypt(key, &plaintext)?;
        let bytes = encode_as(self.format, &sealed)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

/// Opens one container in place.
///
/// The configured layout is tried first, then the detected one, so a raw
/// container whose IV happens to start with the versioned magic still opens.
/// A file that decodes under neither layout is not a container.
async fn decrypt_file(
    path: &Path,
    key: &SessionKey,
    format: ContainerFormat,
) -> ClientResult<DecryptStatus> {
    let bytes = tokio::fs::read(path).await?;

    let mut candidates = Vec::with_capacity(2);
    let mut decode_error = None;
    match decode_as(format, &bytes) {
        Ok(sealed) => candidates.push(sealed),
        Err(e) => decode_error = Some(e),
    }
    let detected = detect(&bytes);
    if detected != format {
        match decode_as(detected, &bytes) {
            Ok(sealed) => candidates.push(sealed),
            Err(e) => decode_error = Some(e),
        }
    }

    let mut auth_error = None;
    for sealed in &candidates {
        match decrypt(key, sealed) {
            Ok(plaintext) => {
                tokio::fs::write(path, plaintext).await?;
                return Ok(DecryptStatus::Decrypted);
            }
            Err(e) => auth_error = Some(e),
        }
    }

    match (auth_error, decode_error) {
        (Some(e), _) => Err(e.into()),
        (None, Some(CryptoError::Malformed(_) | CryptoError::UnsupportedVersion(_)) | None) => {
            Ok(DecryptStatus::NotAContainer)
        }
        (None, Some(e)) => Err(e.into()),
    }
}
