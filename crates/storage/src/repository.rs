use async_trait::async_trait;
use drill_core::model::{AssetResponse, RequestKey};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key under which the last selected practice category is stored.
pub const CATEGORY_PREFERENCE_KEY: &str = "drill.category";

/// Small string key/value store that survives restarts.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Read a preference value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a preference value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Named, versioned response caches keyed by request identity.
///
/// Every write of a single key is atomic; `put_all` commits a whole batch or
/// nothing.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// List the names of all stored caches.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn cache_names(&self) -> Result<Vec<String>, StorageError>;

    /// Drop a cache and every entry in it. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_cache(&self, name: &str) -> Result<bool, StorageError>;

    /// Look up a stored response in one cache.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the row is corrupt.
    async fn match_entry(
        &self,
        name: &str,
        key: &RequestKey,
    ) -> Result<Option<AssetResponse>, StorageError>;

    /// Store a response, creating the cache if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn put_entry(
        &self,
        name: &str,
        key: &RequestKey,
        response: &AssetResponse,
    ) -> Result<(), StorageError>;

    /// Store a batch of responses atomically, creating the cache if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be committed; nothing is
    /// stored in that case.
    async fn put_all(
        &self,
        name: &str,
        entries: &[(RequestKey, AssetResponse)],
    ) -> Result<(), StorageError>;
}

type CacheMap = BTreeMap<String, HashMap<RequestKey, AssetResponse>>;

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    preferences: Arc<Mutex<HashMap<String, String>>>,
    caches: Arc<Mutex<CacheMap>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl PreferenceRepository for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.preferences.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.preferences.lock().map_err(poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for InMemoryRepository {
    async fn cache_names(&self) -> Result<Vec<String>, StorageError> {
        let guard = self.caches.lock().map_err(poisoned)?;
        Ok(guard.keys().cloned().collect())
    }

    async fn delete_cache(&self, name: &str) -> Result<bool, StorageError> {
        let mut guard = self.caches.lock().map_err(poisoned)?;
        Ok(guard.remove(name).is_some())
    }

    async fn match_entry(
        &self,
        name: &str,
        key: &RequestKey,
    ) -> Result<Option<AssetResponse>, StorageError> {
        let guard = self.caches.lock().map_err(poisoned)?;
        Ok(guard.get(name).and_then(|cache| cache.get(key)).cloned())
    }

    async fn put_entry(
        &self,
        name: &str,
        key: &RequestKey,
        response: &AssetResponse,
    ) -> Result<(), StorageError> {
        let mut guard = self.caches.lock().map_err(poisoned)?;
        guard
            .entry(name.to_string())
            .or_default()
            .insert(key.clone(), response.clone());
        Ok(())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: &[(RequestKey, AssetResponse)],
    ) -> Result<(), StorageError> {
        let mut guard = self.caches.lock().map_err(poisoned)?;
        let cache = guard.entry(name.to_string()).or_default();
        for (key, response) in entries {
            cache.insert(key.clone(), response.clone());
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferenceRepository>,
    pub asset_cache: Arc<dyn CacheStorage>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let preferences: Arc<dyn PreferenceRepository> = Arc::new(repo.clone());
        let asset_cache: Arc<dyn CacheStorage> = Arc::new(repo);
        Self {
            preferences,
            asset_cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{AssetRequest, RequestMethod};

    fn key(path: &str) -> RequestKey {
        AssetRequest::parse(RequestMethod::Get, &format!("https://drill.test/{path}"))
            .unwrap()
            .key()
    }

    #[tokio::test]
    async fn preferences_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get(CATEGORY_PREFERENCE_KEY).await.unwrap(), None);

        repo.set(CATEGORY_PREFERENCE_KEY, "fem").await.unwrap();
        repo.set(CATEGORY_PREFERENCE_KEY, "neut").await.unwrap();

        assert_eq!(
            repo.get(CATEGORY_PREFERENCE_KEY).await.unwrap().as_deref(),
            Some("neut")
        );
    }

    #[tokio::test]
    async fn caches_are_isolated_by_name() {
        let repo = InMemoryRepository::new();
        let body = AssetResponse::ok(Some("text/plain"), "v1 body");
        repo.put_entry("v1", &key("a"), &body).await.unwrap();
        repo.put_all("v2", &[(key("b"), AssetResponse::ok(None, "b"))])
            .await
            .unwrap();

        assert_eq!(repo.cache_names().await.unwrap(), vec!["v1", "v2"]);
        assert_eq!(repo.match_entry("v1", &key("a")).await.unwrap(), Some(body));
        assert_eq!(repo.match_entry("v2", &key("a")).await.unwrap(), None);

        assert!(repo.delete_cache("v1").await.unwrap());
        assert!(!repo.delete_cache("v1").await.unwrap());
        assert_eq!(repo.cache_names().await.unwrap(), vec!["v2"]);
    }

    #[test]
    fn storage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Storage>();
    }
}
