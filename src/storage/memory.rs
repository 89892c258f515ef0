use super::Storage;
use crate::error::AppError;
use crate::safe_lock;
use std::collections::HashMap;
use std::sync::Mutex;

/// Volatile storage. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with raw text, bypassing any store.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        safe_lock(&storage.entries, "MemoryStorage").insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(safe_lock(&self.entries, "MemoryStorage").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        safe_lock(&self.entries, "MemoryStorage").insert(key.to_string(), value.to_string());
        Ok(())
    }
}
