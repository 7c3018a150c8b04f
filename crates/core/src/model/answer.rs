use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Raised when a string does not name a known answer key or case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct ParseKeyError {
    kind: &'static str,
    raw: String,
}

impl ParseKeyError {
    pub(crate) fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

//
// ─── ANSWER KEY ───────────────────────────────────────────────────────────────
//

/// The grammatical choice a learner picks for a blank.
///
/// Correctness is always decided by comparing keys; the article shown for a
/// key depends on the active category and is resolved elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKey {
    Nom,
    Akk,
    Dat,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 3] = [AnswerKey::Nom, AnswerKey::Akk, AnswerKey::Dat];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::Nom => "nom",
            AnswerKey::Akk => "akk",
            AnswerKey::Dat => "dat",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nom" => Ok(Self::Nom),
            "akk" => Ok(Self::Akk),
            "dat" => Ok(Self::Dat),
            _ => Err(ParseKeyError::new("answer key", s)),
        }
    }
}

//
// ─── TARGET CASE ──────────────────────────────────────────────────────────────
//

/// Grammatical case a question drills. `Nom` covers questions where the
/// nominative is implied by the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCase {
    Nom,
    Akk,
    Dat,
}

impl TargetCase {
    pub const ALL: [TargetCase; 3] = [TargetCase::Nom, TargetCase::Akk, TargetCase::Dat];

    /// Stable position used by per-case tallies.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            TargetCase::Nom => 0,
            TargetCase::Akk => 1,
            TargetCase::Dat => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetCase::Nom => "nom",
            TargetCase::Akk => "akk",
            TargetCase::Dat => "dat",
        }
    }
}

impl fmt::Display for TargetCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCase {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nom" => Ok(Self::Nom),
            "akk" => Ok(Self::Akk),
            "dat" => Ok(Self::Dat),
            _ => Err(ParseKeyError::new("target case", s)),
        }
    }
}
