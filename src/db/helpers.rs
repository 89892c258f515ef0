// src/db/helpers.rs

use crate::db::Database;
use crate::error::AppError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Execute a database operation with lock handling and error logging.
///
/// # Example
/// ```ignore
/// with_connection(&db, "read key", |conn| {
///     conn.query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
/// })
/// ```
pub fn with_connection<F, T>(
    db: &Arc<Mutex<Database>>,
    operation: &str,
    f: F,
) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let db = db.lock().map_err(|e| {
        log::error!("Failed to acquire database lock for {operation}: {e}");
        AppError::LockPoisoned
    })?;

    f(db.connection()).map_err(|e| {
        log::error!("Failed to {operation}: {e}");
        AppError::Database(e)
    })
}
