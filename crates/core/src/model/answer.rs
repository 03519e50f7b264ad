use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::question::QuestionKind;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Normalization failed: the input matches none of the accepted forms.
///
/// This is a recoverable signal, not a bug. The question stays pending and
/// the caller is expected to prompt for a resubmission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("answer {raw:?} is not recognized for a {kind} question")]
pub struct AnswerParseError {
    pub raw: String,
    pub kind: QuestionKind,
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// Canonical answer shape used for exact-equality scoring.
///
/// A raw user string is normalized into one of these variants conditioned on
/// the pending question's kind; comparison against the stored correct answer
/// is then plain equality with no partial credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// Lowercase option letter of a multiple choice question.
    Choice(char),
    TrueFalse(bool),
    YesNo(bool),
}

impl Answer {
    /// Normalize a raw user answer for a question of the given kind.
    ///
    /// Accepted forms:
    /// - multiple choice: a single letter within the option range, alone or
    ///   with a `"b)"` / `"b."` style suffix (case-insensitive)
    /// - true/false: `true`/`false` or the `t`/`f` shorthand
    /// - yes/no: `yes`/`no` or the `y`/`n` shorthand
    ///
    /// # Errors
    ///
    /// Returns `AnswerParseError` when the input matches none of the accepted
    /// forms. Normalization is pure and never panics.
    pub fn normalize(
        raw: &str,
        kind: QuestionKind,
        option_count: usize,
    ) -> Result<Self, AnswerParseError> {
        let trimmed = raw.trim();
        let lowered = trimmed.to_lowercase();
        let unrecognized = || AnswerParseError {
            raw: trimmed.to_string(),
            kind,
        };

        match kind {
            QuestionKind::MultipleChoice => {
                let letter = extract_choice_letter(&lowered).ok_or_else(unrecognized)?;
                let index = usize::from(letter as u8 - b'a');
                if index >= option_count {
                    return Err(unrecognized());
                }
                Ok(Self::Choice(letter))
            }
            QuestionKind::TrueFalse => match lowered.as_str() {
                "true" | "t" => Ok(Self::TrueFalse(true)),
                "false" | "f" => Ok(Self::TrueFalse(false)),
                _ => Err(unrecognized()),
            },
            QuestionKind::YesNo => match lowered.as_str() {
                "yes" | "y" => Ok(Self::YesNo(true)),
                "no" | "n" => Ok(Self::YesNo(false)),
                _ => Err(unrecognized()),
            },
        }
    }
}

/// Extracts the leading option letter from inputs like `"b"`, `"b)"` or
/// `"b) growth"`. Plain words (`"both"`) are rejected.
fn extract_choice_letter(lowered: &str) -> Option<char> {
    let mut chars = lowered.chars();
    let first = chars.next()?;
    if !first.is_ascii_lowercase() {
        return None;
    }
    match chars.next() {
        None => Some(first),
        Some(')' | '.' | ':') => Some(first),
        Some(_) => None,
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Choice(letter) => write!(f, "{letter}"),
            Answer::TrueFalse(true) => write!(f, "true"),
            Answer::TrueFalse(false) => write!(f, "false"),
            Answer::YesNo(true) => write!(f, "yes"),
            Answer::YesNo(false) => write!(f, "no"),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
