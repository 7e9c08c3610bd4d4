//! Cached client identity and the escrow handshake.
//!
//! The identity issued by the service is cached as JSON so later runs reuse
//! it. If the service reports the identity as unknown while escrowing, the
//! cache is discarded, a new identity is acquired, and the escrow is retried
//! exactly once with the key re-wrapped under the new public key.

use crate::api_client::EscrowApiClient;
use crate::error::{ClientError, ClientResult};
use crate::types::IdentityInfo;
use escrow_crypto::envelope::parse_public_key_pem;
use escrow_crypto::{SessionKey, WrapScheme, wrap_key};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct IdentitySession {
    api: EscrowApiClient,
    cache_path: PathBuf,
    current: Option<IdentityInfo>,
}

impl IdentitySession {
    pub fn new(api: EscrowApiClient, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            cache_path: cache_path.into(),
            current: None,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// The identity in use, if one has been loaded or acquired.
    pub fn current(&self) -> Option<&IdentityInfo> {
        self.current.as_ref()
    }

    /// Returns the identity in memory or on disk without contacting the service.
    ///
    /// An unreadable cache file is treated as absent.
    pub async fn cached_identity(&mut self) -> ClientResult<Option<IdentityInfo>> {
        if self.current.is_none() {
            self.current = self.read_cache().await?;
        }
        Ok(self.current.clone())
    }

    /// Returns the cached identity, acquiring and caching a new one if needed.
    pub async fn ensure_identity(&mut self) -> ClientResult<IdentityInfo> {
        if let Some(identity) = self.cached_identity().await? {
            return Ok(identity);
        }

        let identity = self.api.create_identity().await?;
        self.write_cache(&identity).await?;
        info!(identity_id = %identity.identity_id, "acquired new identity");
        self.current = Some(identity.clone());
        Ok(identity)
    }

    /// Forgets the current identity and deletes the cache file.
    pub async fn reset(&mut self) -> ClientResult<()> {
        self.current = None;
        match tokio::fs::remove_file(&self.cache_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Wraps `key` under the session identity and escrows it.
    ///
    /// Returns the identity the key was escrowed under. On
    /// [`ClientError::IdentityNotFound`] the session is reset and the escrow is
    /// retried once under a freshly acquired identity; a second rejection is
    /// returned to the caller.
    pub async fn escrow_session_key(
        &mut self,
        key: &SessionKey,
        files_count: u32,
        scheme: WrapScheme,
    ) -> ClientResult<IdentityInfo> {
        let identity = self.ensure_identity().await?;
        match self.wrap_and_store(&identity, key, files_count, scheme).await {
            Err(ClientError::IdentityNotFound(stale)) => {
                warn!(
                    identity_id = %stale,
                    "server does not know cached identity, acquiring a new one"
                );
                self.reset().await?;
                let identity = self.ensure_identity().await?;
                self.wrap_and_store(&identity, key, files_count, scheme).await?;
                Ok(identity)
            }
            Err(e) => Err(e),
            Ok(()) => Ok(identity),
        }
    }

    async fn wrap_and_store(
        &self,
        identity: &IdentityInfo,
        key: &SessionKey,
        files_count: u32,
        scheme: WrapScheme,
    ) -> ClientResult<()> {
        let public = parse_public_key_pem(&identity.public_key)?;
        let wrapped = wrap_key(key, &public, scheme)?;
        self.api
            .store_wrapped_key(&identity.identity_id, &wrapped, files_count)
            .await
    }

    async fn read_cache(&self) -> ClientResult<Option<IdentityInfo>> {
        let bytes = match tokio::fs::read(&self.cache_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                warn!("ignoring unreadable identity cache {}: {e}", self.cache_path.display());
                Ok(None)
            }
        }
    }

    async fn write_cache(&self, identity: &IdentityInfo) -> ClientResult<()> {
        if let Some(parent) = self.cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(identity)?;
        tokio::fs::write(&self.cache_path, json).await?;
        Ok(())
    }
}
