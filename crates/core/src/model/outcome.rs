use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;

/// Correctness outcome for one answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// Record of a single scored answer.
///
/// One entry is appended per answered question; the ordered log sequence is
/// the session's outcome history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerLog {
    pub question_id: QuestionId,
    pub outcome: Outcome,
    pub answered_at: DateTime<Utc>,
}

impl AnswerLog {
    #[must_use]
    pub fn new(question_id: QuestionId, outcome: Outcome, answered_at: DateTime<Utc>) -> Self {
        Self {
            question_id,
            outcome,
            answered_at,
        }
    }
}
