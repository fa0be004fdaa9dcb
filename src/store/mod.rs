//! Key-value collaborator holding shared room state
//!
//! Paths are slash-separated and values are JSON. There are no transactions:
//! every write is independent and the last one wins.

mod firebase;
mod keyed;
mod memory;
mod paths;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub use firebase::FirebaseStore;
pub use keyed::{child_keys, keyed_entries};
pub use memory::MemoryStore;
pub use paths::{validate_key, RoomPaths, DEFAULT_ROOT};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Store request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store returned status {status} for '{path}'")]
    Status { status: u16, path: String },

    #[error("Malformed value at '{path}': {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Trait that all room state backends implement
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Read the value at `path`, `None` when absent
    async fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Replace the value at `path`
    async fn set(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Remove `path` and everything below it
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Name of this backend, for logging
    fn name(&self) -> &str;
}

/// Typed read on top of [`RoomStore::get`]
pub async fn get_as<T: DeserializeOwned>(store: &dyn RoomStore, path: &str) -> StoreResult<Option<T>> {
    match store.get(path).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                path: path.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Typed write on top of [`RoomStore::set`]
pub async fn set_as<T: serde::Serialize>(store: &dyn RoomStore, path: &str, value: &T) -> StoreResult<()> {
    let value = serde_json::to_value(value).map_err(|source| StoreError::Malformed {
        path: path.to_string(),
        source,
    })?;
    store.set(path, value).await
}
