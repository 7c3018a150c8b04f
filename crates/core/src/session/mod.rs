//! Quiz session engine: sampling, answering, scoring and statistics.
//!
//! Pure state and transitions. Callers serialize `submit_answer` and
//! `advance` (a `&mut Session` enforces this).

mod engine;
mod stats;
mod summary;

use thiserror::Error;

pub use engine::{AnswerOutcome, Session, SessionPhase};
pub use stats::{CaseStats, CaseTally};
pub use summary::{MistakeRecord, SessionProgress, SessionSummary};

/// Number of questions drawn for a session unless configured otherwise.
pub const DEFAULT_SESSION_SIZE: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    EmptyPool,

    #[error("session already completed")]
    Completed,

    #[error("current question already answered")]
    AlreadyAnswered,
}
