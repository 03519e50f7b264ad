use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::answer::{Answer, AnswerParseError};
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple choice questions need between 2 and 26 options, got {got}")]
    InvalidOptionCount { got: usize },

    #[error("{kind} questions do not take options")]
    UnexpectedOptions { kind: QuestionKind },

    #[error("option text cannot be empty")]
    EmptyOption,

    #[error("correct answer {raw:?} does not fit the question: {source}")]
    InconsistentAnswer {
        raw: String,
        source: AnswerParseError,
    },
}

//
// ─── QUESTION KIND ─────────────────────────────────────────────────────────────
//

/// The three supported question formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    YesNo,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::YesNo => "yes_no",
        };
        write!(f, "{name}")
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question content as produced by a generator.
///
/// Deserializable so structured generator output can land here directly;
/// only `validate()` can turn it into a `Question`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// Enforces the generator consistency rule: the declared correct answer
    /// must normalize against this question's own kind and option count.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt or options are malformed, or
    /// when the correct answer does not fit the question.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let prompt = self.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|option| option.trim().to_string())
            .collect();

        match self.kind {
            QuestionKind::MultipleChoice => {
                if !(2..=26).contains(&options.len()) {
                    return Err(QuestionError::InvalidOptionCount { got: options.len() });
                }
                if options.iter().any(String::is_empty) {
                    return Err(QuestionError::EmptyOption);
                }
            }
            QuestionKind::TrueFalse | QuestionKind::YesNo => {
                if !options.is_empty() {
                    return Err(QuestionError::UnexpectedOptions { kind: self.kind });
                }
            }
        }

        let correct_answer = Answer::normalize(&self.correct_answer, self.kind, options.len())
            .map_err(|source| QuestionError::InconsistentAnswer {
                raw: self.correct_answer.clone(),
                source,
            })?;

        Ok(Question {
            id: QuestionId::random(),
            kind: self.kind,
            prompt,
            options,
            correct_answer,
            explanation: self.explanation.trim().to_string(),
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated quiz question. Immutable once created; the session state owns
/// it in `asked` history after it has been issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    options: Vec<String>,
    correct_answer: Answer,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Option texts without letter prefixes; empty for non-choice kinds.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &Answer {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_draft(correct: &str) -> QuestionDraft {
        QuestionDraft {
            kind: QuestionKind::MultipleChoice,
            prompt: "Which asset is most liquid?".into(),
            options: vec![
                "Real estate".into(),
                "Cash".into(),
                "Equipment".into(),
                "Goodwill".into(),
            ],
            correct_answer: correct.into(),
            explanation: "Cash needs no conversion.".into(),
        }
    }

    #[test]
    fn valid_multiple_choice_draft_validates() {
        let question = choice_draft("b").validate().unwrap();
        assert_eq!(question.kind(), QuestionKind::MultipleChoice);
        assert_eq!(question.options().len(), 4);
        assert_eq!(*question.correct_answer(), Answer::Choice('b'));
    }

    #[test]
    fn correct_answer_accepts_prefixed_form() {
        let question = choice_draft("B) Cash").validate().unwrap();
        assert_eq!(*question.correct_answer(), Answer::Choice('b'));
    }

    #[test]
    fn correct_answer_outside_options_is_rejected() {
        let err = choice_draft("f").validate().unwrap_err();
        assert!(matches!(err, QuestionError::InconsistentAnswer { .. }));
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let mut draft = choice_draft("a");
        draft.prompt = "   ".into();
        assert!(matches!(
            draft.validate(),
            Err(QuestionError::EmptyPrompt)
        ));
    }

    #[test]
    fn single_option_is_rejected() {
        let mut draft = choice_draft("a");
        draft.options.truncate(1);
        assert!(matches!(
            draft.validate(),
            Err(QuestionError::InvalidOptionCount { got: 1 })
        ));
    }

    #[test]
    fn true_false_with_options_is_rejected() {
        let draft = QuestionDraft {
            kind: QuestionKind::TrueFalse,
            prompt: "Bonds are debt.".into(),
            options: vec!["true".into(), "false".into()],
            correct_answer: "true".into(),
            explanation: String::new(),
        };
        assert!(matches!(
            draft.validate(),
            Err(QuestionError::UnexpectedOptions {
                kind: QuestionKind::TrueFalse
            })
        ));
    }

    #[test]
    fn yes_no_draft_validates() {
        let draft = QuestionDraft {
            kind: QuestionKind::YesNo,
            prompt: "Does diversification reduce specific risk?".into(),
            options: Vec::new(),
            correct_answer: "Yes".into(),
            explanation: "Spreading holdings dilutes single-name exposure.".into(),
        };
        let question = draft.validate().unwrap();
        assert_eq!(*question.correct_answer(), Answer::YesNo(true));
    }

    #[test]
    fn draft_parses_from_json() {
        let json = r#"{
            "kind": "true_false",
            "prompt": "A bond is debt financing.",
            "correct_answer": "true",
            "explanation": "Bondholders are lenders."
        }"#;
        let draft: QuestionDraft = serde_json::from_str(json).unwrap();
        let question = draft.validate().unwrap();
        assert_eq!(question.kind(), QuestionKind::TrueFalse);
    }
}
