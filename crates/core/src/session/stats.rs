use crate::model::TargetCase;

/// Answer counters for a single case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseTally {
    pub answered: u32,
    pub correct: u32,
}

impl CaseTally {
    /// Share of correct answers as a rounded percentage, `None` when the case
    /// was never answered.
    #[must_use]
    pub fn rate_percent(&self) -> Option<u8> {
        if self.answered == 0 {
            return None;
        }
        let correct = u64::from(self.correct.min(self.answered));
        let answered = u64::from(self.answered);
        // round half up
        let pct = (correct * 200 + answered) / (answered * 2);
        Some(u8::try_from(pct).unwrap_or(100))
    }
}

/// Per-case tallies for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseStats {
    tallies: [CaseTally; 3],
}

impl CaseStats {
    pub(crate) fn record(&mut self, case: TargetCase, is_correct: bool) {
        let tally = &mut self.tallies[case.index()];
        tally.answered = tally.answered.saturating_add(1);
        if is_correct {
            tally.correct = tally.correct.saturating_add(1);
        }
    }

    #[must_use]
    pub fn tally(&self, case: TargetCase) -> CaseTally {
        self.tallies[case.index()]
    }

    #[must_use]
    pub fn rate_percent(&self, case: TargetCase) -> Option<u8> {
        self.tally(case).rate_percent()
    }

    /// Sum of answered counts across all cases.
    #[must_use]
    pub fn total_answered(&self) -> u32 {
        self.tallies.iter().map(|t| t.answered).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_undefined_without_answers() {
        assert_eq!(CaseTally::default().rate_percent(), None);
    }

    #[test]
    fn rate_rounds_half_up() {
        let tally = CaseTally {
            answered: 8,
            correct: 1,
        };
        // 12.5% -> 13%
        assert_eq!(tally.rate_percent(), Some(13));

        let thirds = CaseTally {
            answered: 3,
            correct: 2,
        };
        assert_eq!(thirds.rate_percent(), Some(67));
    }

    #[test]
    fn record_only_touches_one_case() {
        let mut stats = CaseStats::default();
        stats.record(TargetCase::Dat, false);
        stats.record(TargetCase::Dat, true);

        assert_eq!(stats.tally(TargetCase::Dat), CaseTally { answered: 2, correct: 1 });
        assert_eq!(stats.tally(TargetCase::Akk), CaseTally::default());
        assert_eq!(stats.total_answered(), 2);
        assert_eq!(stats.rate_percent(TargetCase::Dat), Some(50));
    }
}
