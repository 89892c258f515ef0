//! Persistence port for the stores.
//!
//! Stores never touch a backend directly; they read and write whole JSON
//! documents through a [`Storage`] implementation so tests can swap the
//! SQLite file for memory.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::constants::CORRUPT_KEY_SUFFIX;
use crate::error::AppError;
use log::{error, warn};

/// String key to string value storage.
///
/// A successful `set` must be visible to the next `get` on any handle
/// sharing the same backend. Backend failures are reported as
/// [`AppError::Storage`].
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Copy unparseable text aside so a later write does not destroy it.
///
/// Only the first corrupt value is kept; failures are logged and swallowed
/// because the caller is already falling back to defaults.
pub(crate) fn preserve_corrupt(storage: &dyn Storage, key: &str, raw: &str) {
    let backup_key = format!("{key}{CORRUPT_KEY_SUFFIX}");
    match storage.get(&backup_key) {
        Ok(Some(_)) => {}
        Ok(None) => {
            if let Err(e) = storage.set(&backup_key, raw) {
                error!("Failed to preserve corrupt '{key}' data: {e}");
            } else {
                warn!("Preserved corrupt '{key}' data under '{backup_key}'");
            }
        }
        Err(e) => error!("Failed to check for existing '{backup_key}': {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserve_corrupt_keeps_first_copy() {
        let storage = MemoryStorage::new();

        preserve_corrupt(&storage, "sessions", "{not json");
        preserve_corrupt(&storage, "sessions", "[also broken");

        assert_eq!(
            storage.get("sessions.corrupt").unwrap().as_deref(),
            Some("{not json")
        );
    }
}
