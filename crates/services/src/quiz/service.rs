use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;

use drill_core::Clock;
use drill_core::model::{AnswerKey, ArticleLabels, Category, QuestionRecord};
use drill_core::session::{
    AnswerOutcome, DEFAULT_SESSION_SIZE, Session, SessionPhase, SessionProgress, SessionSummary,
};
use storage::repository::{CATEGORY_PREFERENCE_KEY, PreferenceRepository};

use crate::error::QuizError;
use crate::question_bank::QuestionBankLoader;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Presentation-facing state of the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    AwaitingAnswer,
    Answered,
    Completed,
}

impl From<SessionPhase> for QuizPhase {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::AwaitingAnswer => Self::AwaitingAnswer,
            SessionPhase::Answered => Self::Answered,
            SessionPhase::Completed => Self::Completed,
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Owns the active category, its question pool and the current session.
///
/// Category changes replace pool and session wholesale and are remembered in
/// the preference store. Nothing carries over between categories.
pub struct QuizService {
    clock: Clock,
    loader: Arc<dyn QuestionBankLoader>,
    preferences: Arc<dyn PreferenceRepository>,
    rng: StdRng,
    session_size: usize,
    category: Category,
    pool: Vec<QuestionRecord>,
    session: Option<Session>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        loader: Arc<dyn QuestionBankLoader>,
        preferences: Arc<dyn PreferenceRepository>,
    ) -> Self {
        Self {
            clock,
            loader,
            preferences,
            rng: StdRng::from_rng(&mut rand::rng()),
            session_size: DEFAULT_SESSION_SIZE,
            category: Category::default(),
            pool: Vec::new(),
            session: None,
        }
    }

    /// Use a deterministic question order.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_session_size(mut self, session_size: usize) -> Self {
        self.session_size = session_size;
        self
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn labels(&self) -> ArticleLabels {
        self.category.labels()
    }

    #[must_use]
    pub fn session_size(&self) -> usize {
        self.session_size
    }

    #[must_use]
    pub fn pool(&self) -> &[QuestionRecord] {
        &self.pool
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Pick the starting category and load its pool.
    ///
    /// `requested` wins over the remembered preference and is remembered once
    /// its pool has loaded. Without it an absent, unreadable or unknown
    /// preference selects the default category.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Load` if the pool cannot be loaded; the service
    /// then holds the chosen category with an empty pool. Returns
    /// `QuizError::Storage` if a requested category cannot be remembered.
    pub async fn bootstrap(&mut self, requested: Option<Category>) -> Result<Category, QuizError> {
        let category = match requested {
            Some(category) => category,
            None => {
                let stored = match self.preferences.get(CATEGORY_PREFERENCE_KEY).await {
                    Ok(value) => value,
                    Err(err) => {
                        tracing::warn!(error = %err, "could not read category preference");
                        None
                    }
                };
                Category::from_preference(stored.as_deref())
            }
        };

        self.category = category;
        self.pool.clear();
        self.session = None;

        self.pool = self
            .loader
            .load(category)
            .await
            .map_err(|source| QuizError::Load { category, source })?;
        tracing::info!(%category, pool = self.pool.len(), "quiz ready");

        if requested.is_some() {
            self.preferences
                .set(CATEGORY_PREFERENCE_KEY, category.id())
                .await?;
        }
        Ok(category)
    }

    /// Switch to `category`, dropping the current session.
    ///
    /// The new pool is loaded before anything changes, so a failed load
    /// leaves category, pool and session as they were.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Load` if the pool cannot be loaded and
    /// `QuizError::Storage` if the preference cannot be written.
    pub async fn change_category(&mut self, category: Category) -> Result<(), QuizError> {
        let pool = self
            .loader
            .load(category)
            .await
            .map_err(|source| QuizError::Load { category, source })?;

        self.category = category;
        self.pool = pool;
        self.session = None;
        tracing::info!(%category, pool = self.pool.len(), "category changed");

        self.preferences
            .set(CATEGORY_PREFERENCE_KEY, category.id())
            .await?;
        Ok(())
    }

    /// Start (or restart) a session from the current pool.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` with `SessionError::EmptyPool` when no
    /// questions are loaded.
    pub fn start_session(&mut self) -> Result<&Session, QuizError> {
        let session = Session::start(
            self.category,
            &self.pool,
            self.session_size,
            &mut self.rng,
            self.clock.now(),
        )?;
        tracing::info!(
            session_id = %session.id(),
            category = %self.category,
            questions = session.questions().len(),
            "session started"
        );
        let session: &Session = self.session.insert(session);
        Ok(session)
    }

    /// Discard the current session without touching the pool.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(session_id = %session.id(), "session reset");
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.session
            .as_ref()
            .map_or(QuizPhase::NotStarted, |session| session.phase().into())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.session.as_ref().and_then(Session::current_question)
    }

    /// Grade an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotStarted` without a session, otherwise the
    /// session's `Completed`/`AlreadyAnswered` errors.
    pub fn submit_answer(&mut self, chosen: AnswerKey) -> Result<AnswerOutcome, QuizError> {
        let labels = self.category.labels();
        let session = self.session.as_mut().ok_or(QuizError::NotStarted)?;
        let outcome = session.submit_answer(chosen, &labels)?;
        tracing::debug!(
            session_id = %session.id(),
            %chosen,
            correct = outcome.is_correct,
            score = session.score(),
            "answer submitted"
        );
        Ok(outcome)
    }

    /// Move to the next question. Without a session this is a no-op.
    pub fn advance(&mut self) -> QuizPhase {
        let Some(session) = self.session.as_mut() else {
            return QuizPhase::NotStarted;
        };
        let phase = session.advance();
        if phase == SessionPhase::Completed {
            tracing::debug!(session_id = %session.id(), score = session.score(), "session completed");
        }
        phase.into()
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(Session::progress)
    }

    #[must_use]
    pub fn summary(&self) -> Option<SessionSummary> {
        self.session.as_ref().map(Session::summary)
    }
}

impl fmt::Debug for QuizService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizService")
            .field("category", &self.category)
            .field("pool_len", &self.pool.len())
            .field("session_size", &self.session_size)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
