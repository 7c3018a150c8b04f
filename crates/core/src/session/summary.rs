use chrono::{DateTime, Utc};

use crate::model::{Category, SessionId, TargetCase};
use crate::session::stats::CaseStats;

/// Logged for every incorrect answer, with labels already resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistakeRecord {
    pub question_text: String,
    pub chosen_label: String,
    pub correct_label: String,
}

/// Snapshot of a session's results. Valid mid-session and after completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub category: Category,
    pub started_at: DateTime<Utc>,
    pub score: u32,
    pub streak: u32,
    pub total: usize,
    pub answered: usize,
    pub case_stats: CaseStats,
    pub mistakes: Vec<MistakeRecord>,
}

impl SessionSummary {
    /// Rounded accuracy for `case`, `None` if the case never came up.
    #[must_use]
    pub fn rate(&self, case: TargetCase) -> Option<u8> {
        self.case_stats.rate_percent(case)
    }

    pub fn rates(&self) -> impl Iterator<Item = (TargetCase, Option<u8>)> + '_ {
        TargetCase::ALL
            .into_iter()
            .map(|case| (case, self.rate(case)))
    }
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the current question, clamped to `total`.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub is_complete: bool,
}
