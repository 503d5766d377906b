//! Repository layer: typed collections over a key-value blob store

pub mod memory;
pub mod profiles;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::{StoreBackend, StoreConfig},
    error::{AppError, AppResult},
};

/// Logical collection keys
pub mod keys {
    pub const INSTRUMENTS: &str = "instruments";
    pub const BOOKINGS: &str = "bookings";
    pub const LOGS: &str = "logs";
    pub const CONSUMABLES: &str = "consumables";
    pub const THEME: &str = "theme";
}

/// Raw blob storage, keyed by name
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> AppResult<()>;
}

/// Main repository struct holding the blob store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn BlobStore>,
    key_prefix: String,
    pub profiles: profiles::ProfilesRepository,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: Arc<dyn BlobStore>, key_prefix: impl Into<String>) -> Self {
        let key_prefix = key_prefix.into();
        Self {
            profiles: profiles::ProfilesRepository::new(store.clone(), key_prefix.clone()),
            store,
            key_prefix,
        }
    }

    /// Build the store selected in configuration
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        let store: Arc<dyn BlobStore> = match config.backend {
            StoreBackend::Memory => Arc::new(memory::MemoryStore::default()),
            StoreBackend::Redis => Arc::new(redis::RedisStore::new(&config.url).await?),
        };
        tracing::info!("Using {} blob store", store.backend_tag());
        Ok(Self::new(store, config.key_prefix.clone()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Load the collection stored under `key`.
    ///
    /// Absence, read failure and malformed content all yield `default`;
    /// the latter two are logged.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.store.get(&self.full_key(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, "Failed to read stored collection, using default: {}", e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Stored collection is malformed, using default: {}", e);
                default
            }
        }
    }

    /// Replace the whole value stored under `key`
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize {}: {}", key, e)))?;
        self.store.set(&self.full_key(key), raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory::MemoryStore;

    #[tokio::test]
    async fn test_load_absent_returns_default() {
        let repo = Repository::new(Arc::new(MemoryStore::default()), "t:");
        let value: Vec<u32> = repo.load("missing", vec![7]).await;
        assert_eq!(value, vec![7]);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = Repository::new(Arc::new(MemoryStore::default()), "t:");
        repo.save(keys::LOGS, &vec!["a".to_string()]).await.unwrap();
        let value: Vec<String> = repo.load(keys::LOGS, Vec::new()).await;
        assert_eq!(value, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_blob_falls_back() {
        let store = Arc::new(MemoryStore::default());
        store.set("t:instruments", "{not json".to_string()).await.unwrap();
        let repo = Repository::new(store, "t:");
        let value: Vec<String> = repo.load(keys::INSTRUMENTS, vec!["fallback".to_string()]).await;
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[tokio::test]
    async fn test_keys_are_prefixed() {
        let store = Arc::new(MemoryStore::default());
        let repo = Repository::new(store.clone(), "lab:");
        repo.save(keys::THEME, "dark").await.unwrap();
        assert_eq!(store.get("lab:theme").await.unwrap(), Some("\"dark\"".to_string()));
    }
}
