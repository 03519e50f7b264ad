use chrono::{DateTime, Utc};

use quiz_core::model::{Answer, Outcome, Question, QuizState, StateError};

use crate::error::TurnError;

/// Evaluates a normalized answer against the pending question and records
/// the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Oracle {
    /// Exact-equality comparison on the normalized shape. No partial credit.
    #[must_use]
    pub fn score(answer: &Answer, correct: &Answer) -> Outcome {
        if answer == correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }

    /// Score the submitted answer and record the outcome atomically: the log
    /// entry, counter, score, and last-outcome flag move together in one
    /// state transition.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidState` if no question is pending; the
    /// state is left unmodified.
    pub fn grade(
        state: &mut QuizState,
        answer: &Answer,
        answered_at: DateTime<Utc>,
    ) -> Result<(Question, Outcome), TurnError> {
        let Some(question) = state.current_question() else {
            return Err(TurnError::InvalidState);
        };
        let outcome = Self::score(answer, question.correct_answer());

        let question = state
            .complete_current(outcome, answered_at)
            .map_err(|_: StateError| TurnError::InvalidState)?;

        Ok((question, outcome))
    }
}
