use std::sync::Arc;

use escrow_storage::{EscrowRecord, EscrowStore, NewEscrowRecord, StorageError};
use tracing::info;

use crate::error::{EscrowError, EscrowResult};

/// Upper bound for [`KeyEscrow::recent`].
pub const MAX_RECENT: usize = 500;

/// Accepts wrapped session keys for known identities.
#[derive(Clone)]
pub struct KeyEscrow {
    store: Arc<dyn EscrowStore>,
}

impl KeyEscrow {
    pub fn new(store: Arc<dyn EscrowStore>) -> Self {
        Self { store }
    }

    /// Appends a wrapped key. Unknown identities are rejected without a write.
    pub async fn store_wrapped_key(
        &self,
        identity_id: &str,
        wrapped_key: Vec<u8>,
        files_count: u32,
        origin_ip: &str,
    ) -> EscrowResult<EscrowRecord> {
        if wrapped_key.is_empty() {
            return Err(EscrowError::Validation("wrappedKey must not be empty".into()));
        }

        let store = Arc::clone(&self.store);
        let new_record = NewEscrowRecord {
            identity_id: identity_id.to_owned(),
            wrapped_key,
            files_count,
            origin_ip: origin_ip.to_owned(),
        };
        let record = tokio::task::spawn_blocking(move || store.store_wrapped_key(new_record))
            .await?
            .map_err(|e| match e {
                StorageError::IdentityNotFound(id) => EscrowError::IdentityNotFound(id),
                other => EscrowError::Storage(other),
            })?;

        info!(
            identity_id = %record.identity_id,
            record_id = record.id,
            files_count = record.files_count,
            origin_ip = %record.origin_ip,
            "escrowed wrapped key"
        );
        Ok(record)
    }

    /// Latest record for an identity by insertion order.
    pub async fn latest(&self, identity_id: &str) -> EscrowResult<Option<EscrowRecord>> {
        let store = Arc::clone(&self.store);
        let identity_id = identity_id.to_owned();
        Ok(tokio::task::spawn_blocking(move || store.latest_for_identity(&identity_id)).await??)
    }

    /// Newest records across identities, clamped to `1..=MAX_RECENT`.
    pub async fn recent(&self, limit: usize) -> EscrowResult<Vec<EscrowRecord>> {
        let store = Arc::clone(&self.store);
        let limit = limit.clamp(1, MAX_RECENT);
        Ok(tokio::task::spawn_blocking(move || store.list_recent(limit)).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use escrow_storage::{Identity, IdentityStore, SqliteStore};
    use zeroize::Zeroizing;

    fn seeded() -> (KeyEscrow, SqliteStore) {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_identity(&Identity {
                identity_id: "known".into(),
                public_key_pem: "pub".into(),
                private_key_pem: Zeroizing::new("priv".into()),
                created_at: Utc::now(),
                origin_ip: "unknown".into(),
            })
            .unwrap();
        (KeyEscrow::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn unknown_identity_is_rejected_without_write() {
        let (escrow, store) = seeded();
        let err = escrow
            .store_wrapped_key("ghost", vec![1; 256], 3, "unknown")
            .await
            .unwrap_err();

        assert!(matches!(err, EscrowError::IdentityNotFound(id) if id == "ghost"));
        assert!(store.list_recent(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_wrapped_key_is_a_validation_error() {
        let (escrow, store) = seeded();
        let err = escrow.store_wrapped_key("known", Vec::new(), 0, "unknown").await.unwrap_err();

        assert!(matches!(err, EscrowError::Validation(_)));
        assert_eq!(store.count_for_identity("known").unwrap(), 0);
    }

    #[tokio::test]
    async fn latest_follows_insertion_order() {
        let (escrow, _store) = seeded();
        escrow.store_wrapped_key("known", vec![1], 1, "a").await.unwrap();
        escrow.store_wrapped_key("known", vec![2], 2, "b").await.unwrap();

        let latest = escrow.latest("known").await.unwrap().unwrap();
        assert_eq!(latest.wrapped_key, vec![2]);
        assert_eq!(latest.origin_ip, "b");
    }

    #[tokio::test]
    async fn recent_limit_is_clamped() {
        let (escrow, _store) = seeded();
        for i in 0..3u8 {
            escrow.store_wrapped_key("known", vec![i], 0, "a").await.unwrap();
        }

        assert_eq!(escrow.recent(0).await.unwrap().len(), 1);
        assert_eq!(escrow.recent(usize::MAX).await.unwrap().len(), 3);
    }
}
