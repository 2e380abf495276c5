//! Storage module for persisting extractor data
//!
//! This module handles everything that has to survive a restart:
//! - SQLite database initialization and schema management
//! - The batch job snapshot, rewritten after every processed item
//! - The sitemap cache map
//!
//! Both documents are read and written whole. Nothing guards against two
//! processes writing the same database at once.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, StorageError, StorageResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Key holding the persisted batch state
pub const BATCH_STATE_KEY: &str = "sitemap_extractor_state";

/// Key holding the sitemap cache map
pub const CACHE_KEY: &str = "sitemap_cache";

/// A store shared between the batch job and the sitemap cache
pub type SharedStore = Arc<Mutex<dyn KeyValueStore + Send>>;

/// Opens the on-disk store and wraps it for sharing
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open the database
pub fn open_storage(path: &Path) -> StorageResult<SharedStore> {
    Ok(share(SqliteStore::new(path)?))
}

/// Wraps a store for sharing
pub fn share<S: KeyValueStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Reads and deserializes the document stored under `key`
pub fn load<T: DeserializeOwned>(store: &SharedStore, key: &str) -> StorageResult<Option<T>> {
    let value = {
        let guard = store.lock().map_err(|_| StorageError::Poisoned)?;
        guard.get(key)?
    };

    match value {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes `document` and stores it under `key`, replacing the old value
pub fn save<T: Serialize>(store: &SharedStore, key: &str, document: &T) -> StorageResult<()> {
    let value = serde_json::to_value(document)?;
    let mut guard = store.lock().map_err(|_| StorageError::Poisoned)?;
    guard.set(key, &value)
}

/// Removes the document stored under `key`
pub fn remove(store: &SharedStore, key: &str) -> StorageResult<bool> {
    let mut guard = store.lock().map_err(|_| StorageError::Poisoned)?;
    guard.remove(key)
}
