use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::Key;
use crate::{KeyValueStore, StoreError};

/// A handle to a single JSON encoded value in storage.
///
/// Obtained via [`ScopedStore::setting()`](crate::ScopedStore::setting).
pub struct Setting<T> {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    key: Key<T>,
}

impl<T> Setting<T> {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, storage_key: String, key: Key<T>) -> Self {
        Self {
            store,
            storage_key,
            key,
        }
    }

    /// Get the current value of this setting.
    ///
    /// Returns `None` if the setting doesn't exist in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails, which may indicate:
    /// - Schema evolution problems (type definition changed)
    /// - Data corruption
    pub async fn get(&self) -> Result<Option<T>, SettingsError>
    where
        T: DeserializeOwned,
    {
        match self.store.get(&self.storage_key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| SettingsError::Json {
                    key: self.key.name,
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Update (or create) this setting with a new value.
    pub async fn update(&self, value: &T) -> Result<(), SettingsError>
    where
        T: Serialize,
    {
        let raw = serde_json::to_string(value).map_err(|source| SettingsError::Json {
            key: self.key.name,
            source,
        })?;
        self.store.set(&self.storage_key, raw).await?;
        Ok(())
    }

    /// Delete this setting from storage.
    pub async fn delete(&self) -> Result<(), SettingsError> {
        self.store.delete(&self.storage_key).await?;
        Ok(())
    }
}

/// Errors that can occur when working with settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to serialize/deserialize setting value
    #[error("Failed to serialize/deserialize setting {key}: {source}")]
    Json {
        #[allow(missing_docs)]
        key: &'static str,
        #[allow(missing_docs)]
        source: serde_json::Error,
    },
    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use crate::{register_setting_key, InMemoryKeyValueStore, ScopedStore};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Chain {
        id: String,
        rpc_url: Option<String>,
    }

    register_setting_key!(const ACTIVE_CHAIN: Chain = "activeChain");

    #[tokio::test]
    async fn test_setting_round_trip() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let scope = ScopedStore::new(store.clone(), "Test_MWPClient_");
        let setting = scope.setting(ACTIVE_CHAIN);

        assert_eq!(setting.get().await.unwrap(), None);

        let chain = Chain {
            id: "0x2105".to_owned(),
            rpc_url: None,
        };
        setting.update(&chain).await.unwrap();

        assert_eq!(
            store.get("Test_MWPClient_activeChain").await.unwrap().as_deref(),
            Some(r#"{"id":"0x2105","rpcUrl":null}"#)
        );
        assert_eq!(setting.get().await.unwrap(), Some(chain));

        setting.delete().await.unwrap();
        assert_eq!(setting.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_setting_reports_corrupt_value() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set("Test_MWPClient_activeChain", "[1,2".to_owned())
            .await
            .unwrap();

        let setting = ScopedStore::new(store, "Test_MWPClient_").setting(ACTIVE_CHAIN);
        assert!(matches!(
            setting.get().await,
            Err(SettingsError::Json {
                key: "activeChain",
                ..
            })
        ));
    }
}
