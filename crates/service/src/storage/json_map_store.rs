use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::StorageError;
use crate::storage::KeyValueStorage;

/// String map, optionally mirrored to a JSON file.
///
/// With a file path it backs the persistent scope and survives restarts;
/// without one it lives as long as the process, which is the session scope.
#[derive(Clone)]
pub struct JsonMapStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
    file_path: Option<PathBuf>,
}

impl JsonMapStore {
    /// Open a file-backed store. Creates the file with an empty map if missing;
    /// an unreadable file is logged and replaced on the next write.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "storage file corrupt; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<String, String> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(|e| StorageError::Backend(e.to_string()))?)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path: Some(file_path) }))
    }

    /// Memory-only store.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(HashMap::new())), file_path: None })
    }

    async fn save(&self) -> Result<(), StorageError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::write(path, data).await.map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    /// List all entries as `(key, value)` pairs, sorted by key.
    pub async fn list(&self) -> Vec<(String, String)> {
        let map = self.inner.read().await;
        let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort();
        entries
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: String, value: String) -> Result<(), StorageError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        drop(map);
        self.save().await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        drop(map);
        if existed {
            self.save().await?;
        }
        Ok(existed)
    }
}

#[async_trait]
impl KeyValueStorage for JsonMapStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> { Ok(self.get(key).await) }
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> { self.insert(key.to_string(), value).await }
    async fn remove_item(&self, key: &str) -> Result<bool, StorageError> { self.remove(key).await }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::open(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.set_item("caoa_credentials", "{}".into()).await?;
        store.set_item("other", "1".into()).await?;
        assert_eq!(store.get_item("caoa_credentials").await?.as_deref(), Some("{}"));

        // remove and reload persistence
        assert!(store.remove_item("other").await?);
        assert!(!store.remove_item("other").await?);
        let reloaded = JsonMapStore::open(&tmp).await?;
        assert_eq!(reloaded.list().await, vec![("caoa_credentials".to_string(), "{}".to_string())]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"not json").await?;
        let store = JsonMapStore::open(&tmp).await?;
        assert!(store.list().await.is_empty());

        store.set_item("k", "v".into()).await?;
        let reloaded = JsonMapStore::open(&tmp).await?;
        assert_eq!(reloaded.get("k").await.as_deref(), Some("v"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_store_is_independent() -> Result<(), anyhow::Error> {
        let a = JsonMapStore::in_memory();
        let b = JsonMapStore::in_memory();
        a.set_item("caoa_form_draft", "x".into()).await?;
        assert!(b.get_item("caoa_form_draft").await?.is_none());
        assert_eq!(a.get_item("caoa_form_draft").await?.as_deref(), Some("x"));
        Ok(())
    }
}
