use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::StoreError;

/// A flat string key-value store, capable of persisting the client's keys and session across
/// restarts.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves a value by its key.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Sets the value for the specified key, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    /// Removes the value for the specified key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// A [KeyValueStore] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
