use std::sync::Arc;

use chrono::Utc;
use escrow_crypto::IdentityKeyPair;
use escrow_storage::{Identity, IdentityStore};
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::EscrowResult;

/// Public half of a freshly issued identity.
#[derive(Debug, Clone)]
pub struct IssuedIdentity {
    pub identity_id: String,
    pub public_key_pem: String,
}

/// Issues custodial identities.
#[derive(Clone)]
pub struct IdentityAuthority {
    store: Arc<dyn IdentityStore>,
}

impl IdentityAuthority {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Generates a keypair under a new UUID and persists it.
    ///
    /// The identity is only returned once the insert has committed, so a
    /// storage failure never leaves a caller holding an unknown id.
    pub async fn create_identity(&self, origin_ip: &str) -> EscrowResult<IssuedIdentity> {
        let store = Arc::clone(&self.store);
        let origin_ip = origin_ip.to_owned();

        let identity = tokio::task::spawn_blocking(move || -> EscrowResult<Identity> {
            let keypair = IdentityKeyPair::generate()?;
            let identity = Identity {
                identity_id: Uuid::new_v4().to_string(),
                public_key_pem: keypair.public_key_pem()?,
                private_key_pem: keypair.private_key_pem()?,
                created_at: Utc::now(),
                origin_ip,
            };
            store.insert_identity(&identity)?;
            Ok(identity)
        })
        .await??;

        info!(
            identity_id = %identity.identity_id,
            origin_ip = %identity.origin_ip,
            "issued identity"
        );

        Ok(IssuedIdentity {
            identity_id: identity.identity_id,
            public_key_pem: identity.public_key_pem,
        })
    }

    pub async fn get_public_key(&self, identity_id: &str) -> EscrowResult<Option<String>> {
        let store = Arc::clone(&self.store);
        let identity_id = identity_id.to_owned();
        let pem = tokio::task::spawn_blocking(move || store.get_public_key(&identity_id)).await??;
        Ok(pem)
    }

    pub(crate) async fn get_private_key(
        &self,
        identity_id: &str,
    ) -> EscrowResult<Option<Zeroizing<String>>> {
        let store = Arc::clone(&self.store);
        let identity_id = identity_id.to_owned();
        let pem = tokio::task::spawn_blocking(move || store.get_private_key(&identity_id)).await??;
        Ok(pem)
    }

    pub async fn identity_count(&self) -> EscrowResult<u64> {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || store.identity_count()).await??)
    }
}
