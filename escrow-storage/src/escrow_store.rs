//! Escrow record repository over SQLite.

use crate::error::{StorageError, StorageResult};
use crate::models::{EscrowRecord, NewEscrowRecord};
use crate::sqlite::SqliteStore;
use crate::EscrowStore;
use chrono::Utc;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::debug;

const RECORD_COLUMNS: &str = "id, identity_id, wrapped_key, files_count, received_at, origin_ip";

impl EscrowStore for SqliteStore {
    fn store_wrapped_key(&self, record: NewEscrowRecord) -> StorageResult<EscrowRecord> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE identity_id = ?1)",
            params![record.identity_id],
            |row| row.get(0),
        )?;
        if !exists {
            // Dropping the transaction rolls it back.
            return Err(StorageError::IdentityNotFound(record.identity_id));
        }

        let received_at = Utc::now();
        tx.execute(
            "INSERT INTO escrow_records (identity_id, wrapped_key, files_count, received_at, origin_ip) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.identity_id,
                record.wrapped_key,
                record.files_count,
                received_at,
                record.origin_ip,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("escrow record {id} appended for identity {}", record.identity_id);

        Ok(EscrowRecord {
            id,
            identity_id: record.identity_id,
            wrapped_key: record.wrapped_key,
            files_count: record.files_count,
            received_at,
            origin_ip: record.origin_ip,
        })
    }

    fn latest_for_identity(&self, identity_id: &str) -> StorageResult<Option<EscrowRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM escrow_records \
                     WHERE identity_id = ?1 ORDER BY id DESC LIMIT 1"
                ),
                params![identity_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list_recent(&self, limit: usize) -> StorageResult<Vec<EscrowRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM escrow_records ORDER BY id DESC LIMIT ?1"
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_for_identity(&self, identity_id: &str) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM escrow_records WHERE identity_id = ?1",
            params![identity_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<EscrowRecord> {
    Ok(EscrowRecord {
        id: row.get(0)?,
        identity_id: row.get(1)?,
        wrapped_key: row.get(2)?,
        files_count: row.get(3)?,
        received_at: row.get(4)?,
        origin_ip: row.get(5)?,
    })
}
