use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use drill_core::model::{AssetRequest, AssetResponse, CacheVersion};
use storage::repository::CacheStorage;

use super::manifest::AssetManifest;
use crate::error::{CacheError, InstallError};
use crate::fetch::Fetcher;

/// Where a handled response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Stored copy from the current cache generation.
    Cache,
    /// Cache miss answered by the network.
    Network,
    /// Request outside the cache's responsibility, fetched untouched.
    Passthrough,
}

/// Response plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handled {
    pub response: AssetResponse,
    pub served_from: ServedFrom,
}

/// Versioned cache-first handler for same-origin reads.
///
/// Lifecycle: `install` stores the manifest under the current version tag,
/// `activate` evicts every other generation, `handle` serves requests.
/// Cached responses are never revalidated; changed content needs a new
/// version tag to reach installed clients.
pub struct AssetCacheManager {
    version: CacheVersion,
    manifest: AssetManifest,
    scope: Url,
    store: Arc<dyn CacheStorage>,
    network: Arc<dyn Fetcher>,
    active: AtomicBool,
}

impl AssetCacheManager {
    /// `scope` is the application root; its origin decides which requests are
    /// intercepted and manifest paths are resolved against it.
    #[must_use]
    pub fn new(
        version: CacheVersion,
        manifest: AssetManifest,
        scope: Url,
        store: Arc<dyn CacheStorage>,
        network: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            version,
            manifest,
            scope,
            store,
            network,
            active: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    #[must_use]
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    #[must_use]
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// True once `activate` has completed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fetch every manifest entry and store them under the current version.
    ///
    /// Nothing is written unless every entry was fetched with a success
    /// status; older generations are left untouched either way.
    ///
    /// # Errors
    ///
    /// Returns `InstallError` for the first entry that fails to resolve or
    /// fetch, or if the batch cannot be stored.
    pub async fn install(&self) -> Result<usize, InstallError> {
        let resolved = self.manifest.resolve(&self.scope)?;
        let mut entries = Vec::with_capacity(resolved.len());

        for (path, url) in resolved {
            let request = AssetRequest::get(url);
            let response = match self.network.fetch(&request).await {
                Ok(response) => response,
                Err(source) => {
                    tracing::warn!(version = %self.version, %path, "install fetch failed");
                    return Err(InstallError::Fetch { path, source });
                }
            };
            if !response.is_success() {
                let status = response.status();
                tracing::warn!(version = %self.version, %path, status, "install fetch rejected");
                return Err(InstallError::Status { path, status });
            }
            entries.push((request.key(), response));
        }

        self.store.put_all(self.version.as_str(), &entries).await?;
        tracing::info!(version = %self.version, assets = entries.len(), "asset cache installed");
        Ok(entries.len())
    }

    /// Delete every cache generation other than the current one and start
    /// handling requests. Returns the evicted cache names.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Storage` if caches cannot be listed or deleted.
    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut evicted = Vec::new();
        for name in self.store.cache_names().await? {
            if name == self.version.as_str() {
                continue;
            }
            if self.store.delete_cache(&name).await? {
                evicted.push(name);
            }
        }

        self.active.store(true, Ordering::Release);
        tracing::info!(version = %self.version, evicted = ?evicted, "asset cache activated");
        Ok(evicted)
    }

    /// Whether `request` is a same-origin read handled by the cache.
    #[must_use]
    pub fn intercepts(&self, request: &AssetRequest) -> bool {
        request.method().is_cacheable() && request.is_same_origin(&self.scope)
    }

    /// Serve a request cache-first.
    ///
    /// Hits return the stored copy without touching the network. Misses go to
    /// the network; whatever response it resolves with is stored before being
    /// returned, whatever its status. Non-intercepted requests are fetched and
    /// returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Fetch` when the network is needed and fails, and
    /// `CacheError::Storage` when the cache cannot be read.
    pub async fn handle(&self, request: &AssetRequest) -> Result<Handled, CacheError> {
        if !self.intercepts(request) {
            let response = self.network.fetch(request).await?;
            return Ok(Handled {
                response,
                served_from: ServedFrom::Passthrough,
            });
        }

        let key = request.key();
        if let Some(response) = self.store.match_entry(self.version.as_str(), &key).await? {
            tracing::debug!(%key, "cache hit");
            return Ok(Handled {
                response,
                served_from: ServedFrom::Cache,
            });
        }

        tracing::debug!(%key, "cache miss");
        let response = self.network.fetch(request).await?;
        // any resolved response is stored, error statuses included;
        // write failures are logged and the response is still served
        if let Err(err) = self
            .store
            .put_entry(self.version.as_str(), &key, &response)
            .await
        {
            tracing::warn!(%key, error = %err, "failed to store fetched asset");
        }

        Ok(Handled {
            response,
            served_from: ServedFrom::Network,
        })
    }
}

impl fmt::Debug for AssetCacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCacheManager")
            .field("version", &self.version)
            .field("scope", &self.scope.as_str())
            .field("manifest_len", &self.manifest.len())
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
