use std::sync::Arc;

use escrow_crypto::{IdentityKeyPair, SessionKey, WrapScheme, unwrap_key};
use escrow_storage::EscrowStore;
use tracing::info;

use super::IdentityAuthority;
use crate::error::{EscrowError, EscrowResult};

/// Recovers raw session keys from the escrow log.
#[derive(Clone)]
pub struct RecoveryService {
    authority: IdentityAuthority,
    escrow: Arc<dyn EscrowStore>,
    scheme: WrapScheme,
}

impl RecoveryService {
    pub fn new(
        authority: IdentityAuthority,
        escrow: Arc<dyn EscrowStore>,
        scheme: WrapScheme,
    ) -> Self {
        Self {
            authority,
            escrow,
            scheme,
        }
    }

    /// Unwraps the most recently escrowed key for `identity_id`.
    ///
    /// Older records for the same identity are never consulted.
    pub async fn recover(&self, identity_id: &str) -> EscrowResult<SessionKey> {
        let escrow = Arc::clone(&self.escrow);
        let id = identity_id.to_owned();
        let record = tokio::task::spawn_blocking(move || escrow.latest_for_identity(&id))
            .await??
            .ok_or_else(|| EscrowError::NoEscrowRecord(identity_id.to_owned()))?;

        let private_pem = self.authority.get_private_key(identity_id).await?.ok_or_else(|| {
            EscrowError::IdentityDataCorruption {
                identity_id: identity_id.to_owned(),
                reason: "private key missing".into(),
            }
        })?;

        let scheme = self.scheme;
        let id = identity_id.to_owned();
        let key = tokio::task::spawn_blocking(move || -> EscrowResult<SessionKey> {
            let keypair = IdentityKeyPair::from_private_key_pem(&private_pem).map_err(|e| {
                EscrowError::IdentityDataCorruption {
                    identity_id: id,
                    reason: e.to_string(),
                }
            })?;
            unwrap_key(&record.wrapped_key, &keypair.private, scheme)
                .map_err(EscrowError::Decryption)
        })
        .await??;

        info!(identity_id = %identity_id, "recovered session key");
        Ok(key)
    }
}
