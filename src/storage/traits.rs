//! Storage traits and error types
//!
//! This module defines the key-value interface the extractor persists through
//! and the associated error types.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persistent key-value backends
///
/// Values are JSON documents. Every write replaces the whole value stored
/// under a key; there are no partial updates.
pub trait KeyValueStore {
    /// Gets the value stored under `key`, or `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &Value) -> StorageResult<()>;

    /// Removes `key`; returns true if a value was present
    fn remove(&mut self, key: &str) -> StorageResult<bool>;
}
