use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

use crate::model::{AnswerKey, Category, LabelResolver, QuestionRecord, SessionId};
use crate::session::SessionError;
use crate::session::stats::CaseStats;
use crate::session::summary::{MistakeRecord, SessionProgress, SessionSummary};

//
// ─── PHASES & OUTCOMES ─────────────────────────────────────────────────────────
//

/// Where a started session stands.
///
/// A session that has not been started yet is represented by its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingAnswer,
    Answered,
    Completed,
}

/// Feedback for a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_key: AnswerKey,
    pub hint: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One bounded run of sampled questions with its own score and statistics.
pub struct Session {
    id: SessionId,
    category: Category,
    questions: Vec<QuestionRecord>,
    current: usize,
    current_answered: bool,
    answered: usize,
    score: u32,
    streak: u32,
    case_stats: CaseStats,
    mistakes: Vec<MistakeRecord>,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Draw up to `session_size` distinct questions from `pool` and start at
    /// the first one.
    ///
    /// The pool is shuffled uniformly (Fisher-Yates) with `rng`, then
    /// truncated, so every question is equally likely to be picked and every
    /// order of the picked questions is equally likely.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if `pool` is empty.
    pub fn start<R>(
        category: Category,
        pool: &[QuestionRecord],
        session_size: usize,
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError>
    where
        R: Rng + ?Sized,
    {
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }

        let mut questions = pool.to_vec();
        questions.shuffle(rng);
        questions.truncate(session_size.min(pool.len()));

        Ok(Self {
            id: SessionId::new_random(),
            category,
            questions,
            current: 0,
            current_answered: false,
            answered: 0,
            score: 0,
            streak: 0,
            case_stats: CaseStats::default(),
            mistakes: Vec::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn case_stats(&self) -> &CaseStats {
        &self.case_stats
    }

    #[must_use]
    pub fn mistakes(&self) -> &[MistakeRecord] {
        &self.mistakes
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.current >= self.questions.len() {
            SessionPhase::Completed
        } else if self.current_answered {
            SessionPhase::Answered
        } else {
            SessionPhase::AwaitingAnswer
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == SessionPhase::Completed
    }

    /// Grade `chosen` against the current question.
    ///
    /// Labels for the mistake log come from `labels`; scoring compares keys
    /// only. The session stays on the current question until `advance`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` when no question remains and
    /// `SessionError::AlreadyAnswered` when the current question was graded.
    pub fn submit_answer(
        &mut self,
        chosen: AnswerKey,
        labels: &dyn LabelResolver,
    ) -> Result<AnswerOutcome, SessionError> {
        let question = self
            .questions
            .get(self.current)
            .ok_or(SessionError::Completed)?;
        if self.current_answered {
            return Err(SessionError::AlreadyAnswered);
        }

        let is_correct = chosen == question.answer;
        if let Some(case) = question.target_case {
            self.case_stats.record(case, is_correct);
        }

        if is_correct {
            self.score = self.score.saturating_add(1);
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
            self.mistakes.push(MistakeRecord {
                question_text: question.text.clone(),
                chosen_label: labels.label(chosen),
                correct_label: labels.label(question.answer),
            });
        }

        let outcome = AnswerOutcome {
            is_correct,
            correct_key: question.answer,
            hint: question.hint.clone(),
        };
        self.current_answered = true;
        self.answered += 1;
        Ok(outcome)
    }

    /// Move to the next question.
    ///
    /// Advancing an unanswered question skips it. Once the end is reached
    /// further calls leave the session completed.
    pub fn advance(&mut self) -> SessionPhase {
        if self.current < self.questions.len() {
            self.current += 1;
            self.current_answered = false;
        }
        self.phase()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        SessionProgress {
            position: (self.current + 1).min(total),
            total,
            answered: self.answered,
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            category: self.category,
            started_at: self.started_at,
            score: self.score,
            streak: self.streak,
            total: self.questions.len(),
            answered: self.answered,
            case_stats: self.case_stats,
            mistakes: self.mistakes.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("streak", &self.streak)
            .field("mistakes_len", &self.mistakes.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TargetCase;
    use crate::session::CaseTally;
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn question(text: &str, case: TargetCase, answer: AnswerKey) -> QuestionRecord {
        QuestionRecord::new(text, Some(case), answer, format!("hint for {text}"))
    }

    fn numbered_pool(n: usize) -> Vec<QuestionRecord> {
        (0..n)
            .map(|i| question(&format!("Q{i}"), TargetCase::Akk, AnswerKey::Akk))
            .collect()
    }

    fn mann() -> QuestionRecord {
        QuestionRecord::new(
            "Ich sehe ___ Mann.",
            Some(TargetCase::Akk),
            AnswerKey::Akk,
            "maskulin, Akkusativ",
        )
    }

    fn start(pool: &[QuestionRecord], size: usize, seed: u64) -> Session {
        let mut rng = StdRng::seed_from_u64(seed);
        Session::start(Category::Masc, pool, size, &mut rng, fixed_now()).unwrap()
    }

    #[test]
    fn empty_pool_returns_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = Session::start(Category::Masc, &[], 20, &mut rng, fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::EmptyPool);
    }

    #[test]
    fn session_size_clamps_to_pool() {
        let session = start(&numbered_pool(3), 20, 7);
        assert_eq!(session.questions().len(), 3);
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
    }

    #[test]
    fn sampled_questions_are_unique_members_of_pool() {
        let pool = numbered_pool(30);
        for (size, seed) in [(0, 1), (1, 2), (10, 3), (30, 4), (45, 5)] {
            let session = start(&pool, size, seed);
            assert_eq!(session.questions().len(), size.min(pool.len()));
            let texts: HashSet<_> = session.questions().iter().map(|q| &q.text).collect();
            assert_eq!(texts.len(), session.questions().len());
            assert!(session.questions().iter().all(|q| pool.contains(q)));
        }
    }

    #[test]
    fn selection_is_not_order_biased() {
        let pool = numbered_pool(4);
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        let mut included: HashMap<String, u32> = HashMap::new();
        let mut first: HashMap<String, u32> = HashMap::new();

        for _ in 0..trials {
            let session = Session::start(Category::Masc, &pool, 2, &mut rng, fixed_now()).unwrap();
            for q in session.questions() {
                *included.entry(q.text.clone()).or_default() += 1;
            }
            *first.entry(session.questions()[0].text.clone()).or_default() += 1;
        }

        // each question: inclusion 1/2, first slot 1/4
        for q in &pool {
            let inc = f64::from(included[&q.text]) / f64::from(trials);
            let fst = f64::from(first[&q.text]) / f64::from(trials);
            assert!((inc - 0.5).abs() < 0.03, "{} included {inc}", q.text);
            assert!((fst - 0.25).abs() < 0.03, "{} first {fst}", q.text);
        }
    }

    #[test]
    fn permutations_of_full_pool_are_equally_likely() {
        let pool = numbered_pool(3);
        let mut rng = StdRng::seed_from_u64(9);
        let trials = 12_000_u32;
        let mut counts: HashMap<Vec<String>, u32> = HashMap::new();

        for _ in 0..trials {
            let session = Session::start(Category::Masc, &pool, 3, &mut rng, fixed_now()).unwrap();
            let order = session.questions().iter().map(|q| q.text.clone()).collect();
            *counts.entry(order).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            assert!((1_750..=2_250).contains(count), "permutation count {count}");
        }
    }

    #[test]
    fn correct_answer_scores_and_counts_case() {
        let mut session = start(&[mann()], 20, 1);
        let labels = Category::Masc.labels();

        let outcome = session.submit_answer(AnswerKey::Akk, &labels).unwrap();

        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_key, AnswerKey::Akk);
        assert_eq!(outcome.hint, "maskulin, Akkusativ");
        assert_eq!(session.score(), 1);
        assert_eq!(session.streak(), 1);
        assert_eq!(
            session.case_stats().tally(TargetCase::Akk),
            CaseTally { answered: 1, correct: 1 }
        );
        assert!(session.mistakes().is_empty());
        assert_eq!(session.phase(), SessionPhase::Answered);
    }

    #[test]
    fn wrong_answer_resets_streak_and_logs_mistake() {
        let pool = vec![mann(), mann()];
        let mut session = start(&pool, 2, 1);
        let labels = Category::Masc.labels();

        session.submit_answer(AnswerKey::Akk, &labels).unwrap();
        session.advance();
        let outcome = session.submit_answer(AnswerKey::Dat, &labels).unwrap();

        assert!(!outcome.is_correct);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.score(), 1);
        assert_eq!(
            session.mistakes(),
            &[MistakeRecord {
                question_text: "Ich sehe ___ Mann.".into(),
                chosen_label: "dem".into(),
                correct_label: "den".into(),
            }]
        );
        assert_eq!(
            session.case_stats().tally(TargetCase::Akk),
            CaseTally { answered: 2, correct: 1 }
        );
    }

    #[test]
    fn single_wrong_answer_counts_answered_not_correct() {
        let mut session = start(&[mann()], 20, 1);
        let outcome = session
            .submit_answer(AnswerKey::Dat, &Category::Masc.labels())
            .unwrap();

        assert!(!outcome.is_correct);
        assert_eq!(session.mistakes().len(), 1);
        assert_eq!(session.mistakes()[0].correct_label, "den");
        assert_eq!(
            session.case_stats().tally(TargetCase::Akk),
            CaseTally { answered: 1, correct: 0 }
        );
    }

    #[test]
    fn double_submit_is_rejected_without_double_scoring() {
        let mut session = start(&[mann()], 20, 1);
        let labels = Category::Masc.labels();
        session.submit_answer(AnswerKey::Akk, &labels).unwrap();

        let err = session.submit_answer(AnswerKey::Akk, &labels).unwrap_err();

        assert_eq!(err, SessionError::AlreadyAnswered);
        assert_eq!(session.score(), 1);
        assert_eq!(session.case_stats().total_answered(), 1);
    }

    #[test]
    fn submit_after_completion_fails() {
        let mut session = start(&[mann()], 20, 1);
        let labels = Category::Masc.labels();
        session.submit_answer(AnswerKey::Akk, &labels).unwrap();
        assert_eq!(session.advance(), SessionPhase::Completed);

        let err = session.submit_answer(AnswerKey::Akk, &labels).unwrap_err();
        assert_eq!(err, SessionError::Completed);
        assert_eq!(session.current_question(), None);
    }

    #[test]
    fn advance_past_end_is_idempotent() {
        let mut session = start(&numbered_pool(2), 2, 3);
        for _ in 0..10 {
            session.advance();
        }
        assert_eq!(session.current_index(), 2);
        assert!(session.current_question().is_none());
        assert_eq!(session.advance(), SessionPhase::Completed);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn advancing_unanswered_question_skips_it() {
        let mut session = start(&numbered_pool(3), 3, 3);
        assert_eq!(session.advance(), SessionPhase::AwaitingAnswer);

        let summary = session.summary();
        assert_eq!(summary.answered, 0);
        assert_eq!(summary.case_stats.total_answered(), 0);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn unset_case_contributes_to_no_tally() {
        let pool = vec![QuestionRecord::new("Das ist ___ Tisch.", None, AnswerKey::Nom, "")];
        let mut session = start(&pool, 1, 1);
        session
            .submit_answer(AnswerKey::Nom, &Category::Masc.labels())
            .unwrap();

        assert_eq!(session.score(), 1);
        assert_eq!(session.case_stats().total_answered(), 0);
        assert_eq!(session.summary().answered, 1);
    }

    #[test]
    fn score_matches_correct_outcomes_over_a_run() {
        let pool: Vec<_> = (0..12)
            .map(|i| {
                let (case, key) = if i % 2 == 0 {
                    (TargetCase::Akk, AnswerKey::Akk)
                } else {
                    (TargetCase::Dat, AnswerKey::Dat)
                };
                question(&format!("Q{i}"), case, key)
            })
            .collect();
        let mut session = start(&pool, 10, 11);
        let labels = Category::Fem.labels();
        let mut correct = 0;
        let mut step = 0;

        while let Some(q) = session.current_question().cloned() {
            let choice = if step % 3 == 0 { AnswerKey::Nom } else { q.answer };
            let outcome = session.submit_answer(choice, &labels).unwrap();
            if outcome.is_correct {
                correct += 1;
            }
            assert_eq!(session.score(), correct);
            assert!(session.score() as usize <= session.current_index() + 1);
            assert_eq!(
                session.case_stats().total_answered() as usize,
                session.summary().answered
            );
            session.advance();
            step += 1;
        }

        assert_eq!(session.mistakes().len(), 10 - correct as usize);
        assert!(session.is_complete());
    }

    #[test]
    fn summary_reflects_only_incremental_change() {
        let mut session = start(&[mann(), mann()], 2, 5);
        let before = session.summary();
        session
            .submit_answer(AnswerKey::Akk, &Category::Masc.labels())
            .unwrap();
        let after = session.summary();

        assert_eq!(after.score, before.score + 1);
        assert_eq!(after.streak, before.streak + 1);
        assert_eq!(after.answered, before.answered + 1);
        assert_eq!(after.rate(TargetCase::Akk), Some(100));
        assert_eq!(before.rate(TargetCase::Akk), None);
        assert_eq!(after.rate(TargetCase::Dat), None);
        assert_eq!(after.mistakes, before.mistakes);
        assert_eq!(after.total, before.total);
        assert_eq!(after.session_id, before.session_id);
        assert_eq!(after.started_at, before.started_at);
        assert_eq!(session.summary(), after);
    }

    #[test]
    fn progress_clamps_position() {
        let mut session = start(&numbered_pool(2), 2, 1);
        assert_eq!(session.progress().position, 1);
        session.advance();
        session.advance();
        let progress = session.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.total, 2);
        assert!(progress.is_complete);
    }
}
