//! Offline asset cache: versioned install, stale-cache eviction and
//! cache-first request handling.

mod cached_fetcher;
mod manager;
mod manifest;

pub use cached_fetcher::CachedFetcher;
pub use manager::{AssetCacheManager, Handled, ServedFrom};
pub use manifest::{AssetManifest, DEFAULT_CACHE_VERSION};
