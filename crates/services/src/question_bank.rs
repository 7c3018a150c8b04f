use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use drill_core::model::{AssetRequest, Category, QuestionBank, QuestionRecord};

use crate::error::LoadError;
use crate::fetch::Fetcher;

/// Source of a category's question pool.
#[async_trait]
pub trait QuestionBankLoader: Send + Sync {
    /// Load every question of `category`, in document order.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the document cannot be fetched or parsed.
    async fn load(&self, category: Category) -> Result<Vec<QuestionRecord>, LoadError>;
}

/// Loads `questions_<category>.json` relative to a base URL.
///
/// Routing the fetcher through the offline cache makes loading work without
/// network access once the cache is installed.
#[derive(Clone)]
pub struct FetchQuestionBankLoader {
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
}

impl FetchQuestionBankLoader {
    #[must_use]
    pub fn new(base_url: Url, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { base_url, fetcher }
    }

    /// URL of the question-bank document for `category`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the path cannot be joined to the base.
    pub fn bank_url(&self, category: Category) -> Result<Url, url::ParseError> {
        self.base_url.join(&category.bank_path())
    }
}

#[async_trait]
impl QuestionBankLoader for FetchQuestionBankLoader {
    async fn load(&self, category: Category) -> Result<Vec<QuestionRecord>, LoadError> {
        let url = self.bank_url(category)?;
        let response = self.fetcher.fetch(&AssetRequest::get(url)).await?;
        if !response.is_success() {
            return Err(LoadError::Status(response.status()));
        }

        let bank: QuestionBank = serde_json::from_slice(response.body())?;
        tracing::debug!(%category, questions = bank.questions.len(), "question bank loaded");
        Ok(bank.questions)
    }
}
