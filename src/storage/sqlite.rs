use super::Storage;
use crate::clock::{Clock, SystemClock};
use crate::db::{with_connection, Database};
use crate::error::AppError;
use rusqlite::{params, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Storage backed by the `kv_store` table.
///
/// Each `set` is a single upsert statement, so a document is replaced
/// atomically.
pub struct SqliteStorage {
    db: Arc<Mutex<Database>>,
}

impl SqliteStorage {
    /// Wrap an already-migrated database.
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        with_connection(&self.db, "read stored value", |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .map_err(|e| storage_error(key, &e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = SystemClock.now_millis();
        with_connection(&self.db, "write stored value", |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map(|_| ())
        })
        .map_err(|e| storage_error(key, &e))
    }
}

fn storage_error(key: &str, e: &AppError) -> AppError {
    AppError::Storage(format!("'{key}': {e}"))
}
