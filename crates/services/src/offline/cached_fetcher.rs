use std::sync::Arc;

use async_trait::async_trait;

use drill_core::model::{AssetRequest, AssetResponse};

use super::manager::AssetCacheManager;
use crate::error::{CacheError, FetchError};
use crate::fetch::Fetcher;

/// Routes fetches through an `AssetCacheManager`.
#[derive(Clone)]
pub struct CachedFetcher {
    manager: Arc<AssetCacheManager>,
}

impl CachedFetcher {
    #[must_use]
    pub fn new(manager: Arc<AssetCacheManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Fetcher for CachedFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        match self.manager.handle(request).await {
            Ok(handled) => Ok(handled.response),
            Err(CacheError::Fetch(err)) => Err(err),
            Err(CacheError::Storage(err)) => Err(FetchError::Cache(err.to_string())),
        }
    }
}
