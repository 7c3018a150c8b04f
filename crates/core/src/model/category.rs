use std::fmt;
use std::str::FromStr;

use crate::model::answer::{AnswerKey, ParseKeyError};

/// Maps an answer key to the text shown for it.
///
/// Only used for display and the mistake log; never for scoring.
pub trait LabelResolver {
    fn label(&self, key: AnswerKey) -> String;
}

/// Grammatical gender grouping that selects the active question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Masc,
    Fem,
    Neut,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Masc, Category::Fem, Category::Neut];

    /// Identifier persisted in preferences and used in file names.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Category::Masc => "masc",
            Category::Fem => "fem",
            Category::Neut => "neut",
        }
    }

    /// Relative path of this category's question-bank document.
    #[must_use]
    pub fn bank_path(self) -> String {
        format!("questions_{}.json", self.id())
    }

    /// Parses a stored identifier, falling back to the default category when
    /// the value is absent or unrecognised.
    #[must_use]
    pub fn from_preference(value: Option<&str>) -> Self {
        value.and_then(|raw| raw.parse().ok()).unwrap_or_default()
    }

    #[must_use]
    pub fn labels(self) -> ArticleLabels {
        ArticleLabels { category: self }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseKeyError::new("category", s))
    }
}

/// Definite articles per case for one gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleLabels {
    category: Category,
}

impl ArticleLabels {
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn article(&self, key: AnswerKey) -> &'static str {
        match (self.category, key) {
            (Category::Masc, AnswerKey::Nom) => "der",
            (Category::Masc, AnswerKey::Akk) => "den",
            (Category::Masc | Category::Neut, AnswerKey::Dat) => "dem",
            (Category::Fem, AnswerKey::Nom | AnswerKey::Akk) => "die",
            (Category::Fem, AnswerKey::Dat) => "der",
            (Category::Neut, AnswerKey::Nom | AnswerKey::Akk) => "das",
        }
    }
}

impl LabelResolver for ArticleLabels {
    fn label(&self, key: AnswerKey) -> String {
        self.article(key).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_falls_back_to_default() {
        assert_eq!(Category::from_preference(None), Category::Masc);
        assert_eq!(Category::from_preference(Some("plural")), Category::Masc);
        assert_eq!(Category::from_preference(Some("neut")), Category::Neut);
    }

    #[test]
    fn bank_path_uses_identifier() {
        assert_eq!(Category::Fem.bank_path(), "questions_fem.json");
    }

    #[test]
    fn labels_follow_gender() {
        let masc = Category::Masc.labels();
        assert_eq!(masc.label(AnswerKey::Akk), "den");
        let fem = Category::Fem.labels();
        assert_eq!(fem.label(AnswerKey::Dat), "der");
        let neut = Category::Neut.labels();
        assert_eq!(neut.label(AnswerKey::Nom), "das");
    }
}
