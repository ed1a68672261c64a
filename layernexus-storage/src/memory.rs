//! In-memory store.

use crate::error::{StorageError, StorageResult};
use crate::KeyValueStore;
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`KeyValueStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, name: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.remove(name);
        Ok(())
    }
}
