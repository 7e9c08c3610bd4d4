//! Identity repository over SQLite.

use crate::error::{StorageError, StorageResult};
use crate::models::Identity;
use crate::sqlite::SqliteStore;
use crate::IdentityStore;
use rusqlite::{ErrorCode, OptionalExtension, params};
use zeroize::Zeroizing;

impl IdentityStore for SqliteStore {
    fn insert_identity(&self, identity: &Identity) -> StorageResult<()> {
        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO identities (identity_id, created_at, origin_ip, private_key, public_key) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                identity.identity_id,
                identity.created_at,
                identity.origin_ip,
                identity.private_key_pem.as_str(),
                identity.public_key_pem,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateIdentity(identity.identity_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get_identity(&self, identity_id: &str) -> StorageResult<Option<Identity>> {
        let conn = self.lock()?;
        let identity = conn
            .query_row(
                "SELECT identity_id, created_at, origin_ip, private_key, public_key \
                 FROM identities WHERE identity_id = ?1",
                params![identity_id],
                |row| {
                    Ok(Identity {
                        identity_id: row.get(0)?,
                        created_at: row.get(1)?,
                        origin_ip: row.get(2)?,
                        private_key_pem: Zeroizing::new(row.get(3)?),
                        public_key_pem: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(identity)
    }

    fn get_public_key(&self, identity_id: &str) -> StorageResult<Option<String>> {
        let conn = self.lock()?;
        let pem = conn
            .query_row(
                "SELECT public_key FROM identities WHERE identity_id = ?1",
                params![identity_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(pem)
    }

    fn get_private_key(&self, identity_id: &str) -> StorageResult<Option<Zeroizing<String>>> {
        let conn = self.lock()?;
        let pem: Option<String> = conn
            .query_row(
                "SELECT private_key FROM identities WHERE identity_id = ?1",
                params![identity_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(pem.map(Zeroizing::new))
    }

    fn identity_count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM identities", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
