use std::sync::Arc;

use crate::{Key, KeyValueStore, Setting, StoreError};

/// A view of a [KeyValueStore] where every key is prefixed with a fixed namespace.
///
/// Two scopes with different prefixes over the same store never see each other's entries.
#[derive(Clone)]
pub struct ScopedStore {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl ScopedStore {
    #[allow(missing_docs)]
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    #[allow(missing_docs)]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn full_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Read a raw string entry.
    pub async fn get_string(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.store.get(&self.full_key(name)).await
    }

    /// Write a raw string entry.
    pub async fn set_string(&self, name: &str, value: String) -> Result<(), StoreError> {
        self.store.set(&self.full_key(name), value).await
    }

    #[allow(missing_docs)]
    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.store.delete(&self.full_key(name)).await
    }

    /// Get a typed handle to a JSON encoded entry in this scope.
    pub fn setting<T>(&self, key: Key<T>) -> Setting<T> {
        Setting::new(self.store.clone(), self.full_key(key.name), key)
    }
}

impl std::fmt::Debug for ScopedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
