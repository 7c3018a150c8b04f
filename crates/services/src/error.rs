//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::model::Category;
use drill_core::session::SessionError;
use storage::repository::StorageError;

/// Errors emitted by `Fetcher` implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("offline cache unavailable: {0}")]
    Cache(String),
}

/// Errors emitted while loading a question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("question bank request returned status {0}")]
    Status(u16),
    #[error("invalid question bank document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid question bank url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no session has been started")]
    NotStarted,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("could not load category {category}: {source}")]
    Load {
        category: Category,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while serving a request through the offline cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while installing a cache generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    #[error("manifest entry {path} is not a valid url: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error("fetching {path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
