//! SQLite-backed store shared by the identity and escrow repositories.

use crate::error::{StorageError, StorageResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Persists identities and escrow records in one SQLite database.
///
/// All access goes through a single connection behind a mutex, which
/// serializes conflicting writes and gives readers a monotonic view of
/// committed records.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens or creates a store at the given path, creating parent directories.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        debug!("opened escrow database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Closes the underlying connection.
    ///
    /// Fails with [`StorageError::StillShared`] while other clones of this
    /// store are alive.
    pub fn close(self) -> StorageResult<()> {
        let mutex = Arc::try_unwrap(self.conn).map_err(|_| StorageError::StillShared)?;
        let conn = mutex.into_inner().map_err(|_| StorageError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StorageError::Database(e))
    }

    pub(crate) fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS identities (
            identity_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            origin_ip TEXT NOT NULL,
            private_key TEXT NOT NULL,
            public_key TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS escrow_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identity_id TEXT NOT NULL REFERENCES identities(identity_id),
            wrapped_key BLOB NOT NULL,
            files_count INTEGER NOT NULL DEFAULT 0,
            received_at TEXT NOT NULL,
            origin_ip TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_escrow_identity ON escrow_records(identity_id, id);
        "#,
    )?;
    Ok(())
}
