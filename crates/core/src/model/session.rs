use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::adaptive::Difficulty;
use crate::model::answer::Answer;
use crate::model::outcome::{AnswerLog, Outcome};
use crate::model::question::Question;
use crate::model::settings::QuizSettings;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("session is no longer active")]
    Inactive,

    #[error("a question is already awaiting an answer")]
    QuestionPending,

    #[error("no question is awaiting an answer")]
    NoPendingQuestion,

    #[error("all {total} questions have already been asked")]
    AllQuestionsAsked { total: u32 },

    #[error("session is not complete: {answered} of {total} answered")]
    NotComplete { answered: u32, total: u32 },
}

//
// ─── QUIZ STATE ────────────────────────────────────────────────────────────────
//

/// The single mutable record of quiz progress, owned by the engine for the
/// session's lifetime.
///
/// Counters are derived from the append-only histories, so
/// `questions_asked == asked.len()` and `questions_answered == logs.len()`
/// hold by construction. All mutations go through methods that check their
/// preconditions first; a failed call leaves the state untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    settings: QuizSettings,
    active: bool,
    difficulty: Difficulty,
    current_question: Option<Question>,
    asked: Vec<Question>,
    logs: Vec<AnswerLog>,
    score: u32,
    last_outcome: Option<Outcome>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizState {
    /// Create a fresh active session from validated settings.
    #[must_use]
    pub fn start(settings: QuizSettings, started_at: DateTime<Utc>) -> Self {
        let difficulty = settings.initial_difficulty();
        Self {
            settings,
            active: true,
            difficulty,
            current_question: None,
            asked: Vec::new(),
            logs: Vec::new(),
            score: 0,
            last_outcome: None,
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Total number of questions issued so far.
    #[must_use]
    pub fn questions_asked(&self) -> u32 {
        self.asked.len() as u32
    }

    /// Total number of questions scored so far.
    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.logs.len() as u32
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn asked_history(&self) -> &[Question] {
        &self.asked
    }

    #[must_use]
    pub fn logs(&self) -> &[AnswerLog] {
        &self.logs
    }

    /// Ordered outcome sequence, one entry per answered question.
    #[must_use]
    pub fn outcome_history(&self) -> Vec<Outcome> {
        self.logs.iter().map(|log| log.outcome).collect()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// True once every configured question has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.questions_answered() == self.settings.total_questions()
    }

    /// Issue a new question and append it to the asked history.
    ///
    /// # Errors
    ///
    /// - `Inactive` if the session is over
    /// - `QuestionPending` if an unanswered question exists; it must be
    ///   scored before another one can be issued
    /// - `AllQuestionsAsked` once the configured total has been reached
    pub fn place_question(&mut self, question: Question) -> Result<(), StateError> {
        if !self.active {
            return Err(StateError::Inactive);
        }
        if self.current_question.is_some() {
            return Err(StateError::QuestionPending);
        }
        let total = self.settings.total_questions();
        if self.questions_asked() >= total {
            return Err(StateError::AllQuestionsAsked { total });
        }

        self.asked.push(question.clone());
        self.current_question = Some(question);
        Ok(())
    }

    /// Record the outcome for the pending question as one atomic transition:
    /// append the log entry, bump the score on a correct answer, set the
    /// last outcome, and clear the pending slot. Returns the completed
    /// question for feedback rendering.
    ///
    /// # Errors
    ///
    /// - `Inactive` if the session is over
    /// - `NoPendingQuestion` if nothing is awaiting an answer
    pub fn complete_current(
        &mut self,
        outcome: Outcome,
        answered_at: DateTime<Utc>,
    ) -> Result<Question, StateError> {
        if !self.active {
            return Err(StateError::Inactive);
        }
        let Some(question) = self.current_question.take() else {
            return Err(StateError::NoPendingQuestion);
        };

        self.logs
            .push(AnswerLog::new(question.id(), outcome, answered_at));
        if outcome.is_correct() {
            self.score = self.score.saturating_add(self.settings.points_per_correct());
        }
        self.last_outcome = Some(outcome);
        Ok(question)
    }

    /// Apply a difficulty proposal. Callers are expected to move at most one
    /// tier per scored answer; the state itself only records the value.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Transition to the terminal state.
    ///
    /// # Errors
    ///
    /// Returns `NotComplete` unless every configured question was answered.
    pub fn finish(&mut self, completed_at: DateTime<Utc>) -> Result<(), StateError> {
        if !self.is_complete() {
            return Err(StateError::NotComplete {
                answered: self.questions_answered(),
                total: self.settings.total_questions(),
            });
        }
        self.active = false;
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// External reset signal: deactivate without completing.
    pub fn abandon(&mut self) {
        self.active = false;
        self.current_question = None;
    }

    /// Aggregate view of the session, usable mid-run for snapshots and at
    /// completion for the summary collaborator.
    #[must_use]
    pub fn report(&self) -> QuizReport {
        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        for log in &self.logs {
            match log.outcome {
                Outcome::Correct => correct = correct.saturating_add(1),
                Outcome::Incorrect => incorrect = incorrect.saturating_add(1),
            }
        }

        let entries = self
            .asked
            .iter()
            .zip(self.logs.iter())
            .map(|(question, log)| ReportEntry {
                prompt: question.prompt().to_string(),
                correct_answer: *question.correct_answer(),
                outcome: log.outcome,
            })
            .collect();

        QuizReport {
            total_questions: self.settings.total_questions(),
            answered: self.questions_answered(),
            score: self.score,
            max_score: self
                .settings
                .total_questions()
                .saturating_mul(self.settings.points_per_correct()),
            correct,
            incorrect,
            final_difficulty: self.difficulty,
            started_at: self.started_at,
            completed_at: self.completed_at,
            entries,
        }
    }
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// One answered question in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub prompt: String,
    pub correct_answer: Answer,
    pub outcome: Outcome,
}

/// Final (or in-flight) statistics for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReport {
    pub total_questions: u32,
    pub answered: u32,
    pub score: u32,
    pub max_score: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub final_difficulty: Difficulty,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub entries: Vec<ReportEntry>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{QuestionDraft, QuestionKind};
    use crate::model::settings::QuizSettingsDraft;
    use crate::time::fixed_now;

    fn tf_question(prompt: &str) -> Question {
        QuestionDraft {
            kind: QuestionKind::TrueFalse,
            prompt: prompt.into(),
            options: Vec::new(),
            correct_answer: "true".into(),
            explanation: "Stated in the source material.".into(),
        }
        .validate()
        .unwrap()
    }

    fn small_state(total: u32) -> QuizState {
        let settings = QuizSettingsDraft {
            total_questions: total,
            ..QuizSettingsDraft::default()
        }
        .validate()
        .unwrap();
        QuizState::start(settings, fixed_now())
    }

    #[test]
    fn fresh_state_is_active_with_zero_counters() {
        let state = small_state(9);
        assert!(state.is_active());
        assert_eq!(state.questions_asked(), 0);
        assert_eq!(state.questions_answered(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.difficulty(), Difficulty::Medium);
        assert!(state.current_question().is_none());
        assert!(state.last_outcome().is_none());
    }

    #[test]
    fn place_question_appends_to_history() {
        let mut state = small_state(2);
        let question = tf_question("Q1");
        state.place_question(question.clone()).unwrap();

        assert_eq!(state.questions_asked(), 1);
        assert_eq!(state.asked_history().len(), 1);
        assert_eq!(state.current_question().unwrap().id(), question.id());
    }

    #[test]
    fn cannot_displace_a_pending_question() {
        let mut state = small_state(2);
        state.place_question(tf_question("Q1")).unwrap();
        let err = state.place_question(tf_question("Q2")).unwrap_err();
        assert_eq!(err, StateError::QuestionPending);
        assert_eq!(state.questions_asked(), 1);
    }

    #[test]
    fn complete_current_is_one_atomic_transition() {
        let mut state = small_state(2);
        state.place_question(tf_question("Q1")).unwrap();
        let at = fixed_now();

        let question = state.complete_current(Outcome::Correct, at).unwrap();
        assert_eq!(question.prompt(), "Q1");
        assert_eq!(state.questions_answered(), 1);
        assert_eq!(state.score(), 1);
        assert_eq!(state.last_outcome(), Some(Outcome::Correct));
        assert!(state.current_question().is_none());
        assert_eq!(state.logs()[0].answered_at, at);
    }

    #[test]
    fn incorrect_answer_does_not_score() {
        let mut state = small_state(2);
        state.place_question(tf_question("Q1")).unwrap();
        state
            .complete_current(Outcome::Incorrect, fixed_now())
            .unwrap();
        assert_eq!(state.score(), 0);
        assert_eq!(state.last_outcome(), Some(Outcome::Incorrect));
    }

    #[test]
    fn completing_without_pending_question_fails() {
        let mut state = small_state(2);
        let err = state
            .complete_current(Outcome::Correct, fixed_now())
            .unwrap_err();
        assert_eq!(err, StateError::NoPendingQuestion);
        assert_eq!(state.questions_answered(), 0);
    }

    #[test]
    fn cannot_ask_beyond_the_configured_total() {
        let mut state = small_state(1);
        state.place_question(tf_question("Q1")).unwrap();
        state
            .complete_current(Outcome::Correct, fixed_now())
            .unwrap();

        let err = state.place_question(tf_question("Q2")).unwrap_err();
        assert_eq!(err, StateError::AllQuestionsAsked { total: 1 });
    }

    #[test]
    fn counters_never_exceed_totals() {
        let mut state = small_state(3);
        for i in 0..3 {
            state.place_question(tf_question(&format!("Q{i}"))).unwrap();
            assert!(state.questions_answered() <= state.questions_asked());
            assert!(state.questions_asked() <= state.settings().total_questions());
            state
                .complete_current(Outcome::Correct, fixed_now())
                .unwrap();
        }
        assert!(state.is_complete());
    }

    #[test]
    fn finish_requires_completion() {
        let mut state = small_state(2);
        let err = state.finish(fixed_now()).unwrap_err();
        assert_eq!(
            err,
            StateError::NotComplete {
                answered: 0,
                total: 2
            }
        );
        assert!(state.is_active());
    }

    #[test]
    fn finish_deactivates_exactly_at_total() {
        let mut state = small_state(1);
        state.place_question(tf_question("Q1")).unwrap();
        state
            .complete_current(Outcome::Incorrect, fixed_now())
            .unwrap();

        let at = fixed_now();
        state.finish(at).unwrap();
        assert!(!state.is_active());
        assert_eq!(state.completed_at(), Some(at));
    }

    #[test]
    fn abandon_deactivates_without_completing() {
        let mut state = small_state(3);
        state.place_question(tf_question("Q1")).unwrap();
        state.abandon();
        assert!(!state.is_active());
        assert!(state.current_question().is_none());
        assert!(state.completed_at().is_none());
    }

    #[test]
    fn mutations_fail_after_abandon() {
        let mut state = small_state(3);
        state.abandon();
        assert_eq!(
            state.place_question(tf_question("Q1")).unwrap_err(),
            StateError::Inactive
        );
        assert_eq!(
            state
                .complete_current(Outcome::Correct, fixed_now())
                .unwrap_err(),
            StateError::Inactive
        );
    }

    #[test]
    fn report_aggregates_logs() {
        let mut state = small_state(2);
        state.place_question(tf_question("Q1")).unwrap();
        state
            .complete_current(Outcome::Correct, fixed_now())
            .unwrap();
        state.place_question(tf_question("Q2")).unwrap();
        state
            .complete_current(Outcome::Incorrect, fixed_now())
            .unwrap();

        let report = state.report();
        assert_eq!(report.answered, 2);
        assert_eq!(report.correct, 1);
        assert_eq!(report.incorrect, 1);
        assert_eq!(report.score, 1);
        assert_eq!(report.max_score, 2);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].prompt, "Q1");
        assert_eq!(report.entries[1].outcome, Outcome::Incorrect);
    }

    #[test]
    fn outcome_history_matches_answered_count() {
        let mut state = small_state(3);
        for outcome in [Outcome::Correct, Outcome::Incorrect] {
            state.place_question(tf_question("Q")).unwrap();
            state.complete_current(outcome, fixed_now()).unwrap();
        }
        let history = state.outcome_history();
        assert_eq!(history.len() as u32, state.questions_answered());
        assert_eq!(history, vec![Outcome::Correct, Outcome::Incorrect]);
    }
}
