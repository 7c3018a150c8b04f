use serde::{Deserialize, Deserializer, Serialize};

use crate::model::answer::{AnswerKey, TargetCase};

/// One fill-in-the-article prompt from a question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub text: String,
    /// Case tallied for this question. Absent or unrecognised values leave the
    /// question out of the per-case statistics.
    #[serde(default, deserialize_with = "lenient_case")]
    pub target_case: Option<TargetCase>,
    pub answer: AnswerKey,
    #[serde(default)]
    pub hint: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        target_case: Option<TargetCase>,
        answer: AnswerKey,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            target_case,
            answer,
            hint: hint.into(),
        }
    }
}

/// Wire shape of a category's question-bank document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

fn lenient_case<'de, D>(deserializer: D) -> Result<Option<TargetCase>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bank_document() {
        let json = r#"{
            "questions": [
                {"text": "Ich sehe ___ Mann.", "targetCase": "akk", "answer": "akk", "hint": "maskulin, Akkusativ"},
                {"text": "Ich helfe ___ Mann.", "targetCase": "dat", "answer": "dat"}
            ]
        }"#;
        let bank: QuestionBank = serde_json::from_str(json).unwrap();

        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[0].target_case, Some(TargetCase::Akk));
        assert_eq!(bank.questions[0].hint, "maskulin, Akkusativ");
        assert_eq!(bank.questions[1].hint, "");
    }

    #[test]
    fn missing_questions_array_is_empty_bank() {
        let bank: QuestionBank = serde_json::from_str("{}").unwrap();
        assert!(bank.questions.is_empty());
    }

    #[test]
    fn unknown_or_missing_case_is_unset() {
        let json = r#"{"questions": [
            {"text": "a", "targetCase": "gen", "answer": "nom"},
            {"text": "b", "answer": "nom"}
        ]}"#;
        let bank: QuestionBank = serde_json::from_str(json).unwrap();
        assert!(bank.questions.iter().all(|q| q.target_case.is_none()));
    }

    #[test]
    fn unknown_answer_key_is_rejected() {
        let json = r#"{"questions": [{"text": "a", "answer": "gen"}]}"#;
        assert!(serde_json::from_str::<QuestionBank>(json).is_err());
    }
}
