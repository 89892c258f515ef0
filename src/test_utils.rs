//! Shared test utilities.
//!
//! Setup helpers and test doubles used across the store and timer tests.

#![cfg(test)]

use crate::clock::Clock;
use crate::db::{migrations, Database};
use crate::error::AppError;
use crate::storage::{MemoryStorage, Storage};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self { now: AtomicI64::new(now) }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// In-memory storage whose writes can be made to fail.
///
/// `new()` rejects every write from the start; `healthy()` accepts writes
/// until `set_failing(true)` is called. Reads always succeed.
pub struct FailingStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn healthy() -> Self {
        let storage = Self::new();
        storage.set_failing(false);
        storage
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for FailingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("write to '{key}' refused")));
        }
        self.inner.set(key, value)
    }
}
