use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;
use tracing::debug;

use crate::{KeyValueStore, StoreError};

/// A [KeyValueStore] backed by a single JSON document on disk.
///
/// The whole document is loaded on [JsonFileStore::open] and rewritten after every mutation. The
/// new contents are written to a sibling temporary file first and then renamed over the old one,
/// so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty one if the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened JSON file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[allow(missing_docs)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(entries)?;

        let mut temp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| StoreError::Internal("Store path has no file name".to_owned()))?;
        temp_name.push(".tmp");
        let temp_path = self.path.with_file_name(temp_name);

        tokio::fs::write(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key.to_owned(), value);
        self.flush(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.flush(&updated).await?;
        *entries = updated;
        Ok(())
    }
}
