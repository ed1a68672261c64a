//! Persistent key-value storage for LayerNEXUS client state.
//!
//! The bearer credential and the cached license record both live here under
//! fixed names. Two backends are provided:
//! - [`MemoryStore`]: process-local, used by tests and ephemeral hosts
//! - [`SqliteStore`]: a single-table SQLite file that survives restarts
//!
//! Stores only promise single-key read/write atomicity. Callers that keep a
//! structured record under one key always write the whole record.

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::{de::DeserializeOwned, Serialize};

/// A named-entry store shared by the auth and license layers.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `name`, if any.
    fn get(&self, name: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `name`, replacing any previous value.
    fn set(&self, name: &str, value: &str) -> StorageResult<()>;

    /// Removes the entry under `name`. Removing a missing entry is not an error.
    fn remove(&self, name: &str) -> StorageResult<()>;
}

/// JSON helpers available on every [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Reads and decodes a JSON value stored under `name`.
    fn get_json<T: DeserializeOwned>(&self, name: &str) -> StorageResult<Option<T>> {
        match self.get(name)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encodes `value` as JSON and stores it under `name`.
    fn set_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(name, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
