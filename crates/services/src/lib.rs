#![forbid(unsafe_code)]

pub mod error;
pub mod fetch;
pub mod offline;
pub mod question_bank;
pub mod quiz;

pub use drill_core::Clock;

pub use error::{CacheError, FetchError, InstallError, LoadError, QuizError};
pub use fetch::{Fetcher, HttpFetcher};
pub use offline::{
    AssetCacheManager, AssetManifest, CachedFetcher, DEFAULT_CACHE_VERSION, Handled, ServedFrom,
};
pub use question_bank::{FetchQuestionBankLoader, QuestionBankLoader};
pub use quiz::{QuizPhase, QuizService};
