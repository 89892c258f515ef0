pub mod blocker;
pub mod clock;
pub mod constants;
pub mod db;
pub mod error;
pub mod host;
pub mod materials;
pub mod models;
pub mod session;
pub mod sessions;
pub mod settings;
pub mod storage;
#[cfg(test)]
mod test_utils;
pub mod timer;
pub mod validation;

use crate::db::{migrations, Database};
use crate::storage::{SqliteStorage, Storage};
use directories::ProjectDirs;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Error type for start-up failures
#[derive(Debug)]
pub enum InitError {
    NoProjectDirs,
    DataDirCreation(std::io::Error),
    DatabaseOpen(rusqlite::Error),
    Migration(rusqlite::Error),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::NoProjectDirs => write!(f, "Could not determine project directories"),
            InitError::DataDirCreation(e) => write!(f, "Could not create data directory: {e}"),
            InitError::DatabaseOpen(e) => write!(f, "Failed to open database: {e}"),
            InitError::Migration(e) => write!(f, "Failed to run database migrations: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

/// Location of the database file, creating its directory if needed.
pub fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs =
        ProjectDirs::from("com", "study-assist", "StudyAssist").ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("study-assist.db"))
}

/// Open and migrate the database at `path`, wrapped as a [`Storage`].
pub fn open_storage(path: &Path) -> Result<Arc<dyn Storage>, InitError> {
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Opened database at {}", path.display());
    Ok(Arc::new(SqliteStorage::new(Arc::new(Mutex::new(db)))))
}

/// A migrated in-memory database wrapped as a [`Storage`]. Nothing outlives
/// the process.
pub fn open_memory_storage() -> Result<Arc<dyn Storage>, InitError> {
    let db = Database::open_in_memory().map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Using in-memory database");
    Ok(Arc::new(SqliteStorage::new(Arc::new(Mutex::new(db)))))
}

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
