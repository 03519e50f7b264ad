//! The per-turn rule engine driving a quiz session.
//!
//! Five rules are evaluated in strict priority order each turn; the first
//! match decides the turn's action. Collaborators are always called before
//! any state mutation, so a failed turn leaves the session untouched and
//! can simply be retried.

use std::sync::Arc;

use quiz_core::model::{Answer, Outcome, Question, QuizReport, QuizSettings, QuizState};
use quiz_core::{Clock, Difficulty, DifficultyAdapter};

use crate::error::TurnError;
use crate::oracle::Oracle;
use crate::sources::{QuestionSource, SummarySource};

//
// ─── TURN ACTIONS ──────────────────────────────────────────────────────────────
//

/// Announced tier movement after a scored answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyShift {
    Raised(Difficulty),
    Lowered(Difficulty),
}

impl DifficultyShift {
    #[must_use]
    pub fn tier(self) -> Difficulty {
        match self {
            DifficultyShift::Raised(tier) | DifficultyShift::Lowered(tier) => tier,
        }
    }
}

/// Outcome-specific feedback for a scored answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub outcome: Outcome,
    /// The completed question, carrying the correct answer and explanation.
    pub question: Question,
    /// Set only when the tier actually moved.
    pub shift: Option<DifficultyShift>,
}

/// Exactly one action is produced per evaluated turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnAction {
    /// No quiz is in progress; control stays with the caller.
    Idle,
    /// A new question was issued at the current difficulty.
    Ask(Question),
    /// A question is still awaiting an answer; the caller should re-prompt.
    AwaitAnswer(Question),
    /// The submitted answer was scored.
    Feedback(Feedback),
    /// The session reached its configured length and was finalized.
    Completed {
        narrative: String,
        report: QuizReport,
    },
}

//
// ─── RULE LADDER ───────────────────────────────────────────────────────────────
//

/// What the engine decided to do for one turn, in rule priority order.
/// Pure: evaluating a plan never touches state or collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TurnPlan {
    /// Rule 1: session inactive.
    Idle,
    /// Rule 2: every question answered; finalize and summarize.
    Finish,
    /// Rule 3: no question pending; request one from the generator.
    NeedQuestion,
    /// Rule 4 (and 5 in sequence): score the candidate answer.
    Answer(String),
    /// A question is pending but the turn carried no candidate answer.
    AwaitAnswer,
}

fn plan(state: &QuizState, input: &str) -> TurnPlan {
    if !state.is_active() {
        return TurnPlan::Idle;
    }
    if state.is_complete() {
        return TurnPlan::Finish;
    }
    if state.current_question().is_none() {
        return TurnPlan::NeedQuestion;
    }
    let candidate = input.trim();
    if candidate.is_empty() {
        TurnPlan::AwaitAnswer
    } else {
        TurnPlan::Answer(candidate.to_string())
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Owns one session's state and drives it turn by turn.
///
/// Sessions are fully isolated: each engine owns its `QuizState` and shares
/// nothing mutable, so independent sessions can run concurrently. Within a
/// session the caller serializes turns; `handle_turn` takes `&mut self`.
pub struct QuizEngine {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    summaries: Arc<dyn SummarySource>,
    adapter: DifficultyAdapter,
    topic: String,
    state: QuizState,
}

impl QuizEngine {
    /// Start a fresh session. Settings are validated at draft time, so
    /// construction is infallible.
    #[must_use]
    pub fn start(
        settings: QuizSettings,
        topic: impl Into<String>,
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        summaries: Arc<dyn SummarySource>,
    ) -> Self {
        let adapter = DifficultyAdapter::new(settings.adaptation_window());
        let state = QuizState::start(settings, clock.now());
        Self {
            clock,
            questions,
            summaries,
            adapter,
            topic: topic.into(),
            state,
        }
    }

    /// Read access to the full session state after each turn.
    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// Evaluate one turn against the rule ladder.
    ///
    /// # Errors
    ///
    /// All `TurnError`s leave the state unchanged; the caller may retry the
    /// same turn. An unrecognized answer keeps the question pending and does
    /// not count as an attempt.
    pub async fn handle_turn(&mut self, input: &str) -> Result<TurnAction, TurnError> {
        match plan(&self.state, input) {
            TurnPlan::Idle => Ok(TurnAction::Idle),
            TurnPlan::Finish => self.finish().await,
            TurnPlan::NeedQuestion => self.ask_next().await,
            TurnPlan::AwaitAnswer => {
                let question = self
                    .state
                    .current_question()
                    .cloned()
                    .ok_or(TurnError::InvalidState)?;
                Ok(TurnAction::AwaitAnswer(question))
            }
            TurnPlan::Answer(raw) => self.score_answer(&raw),
        }
    }

    /// Strict answer submission: unlike `handle_turn`, a submission with no
    /// outstanding question is rejected with `NoPendingQuestion` instead of
    /// triggering question generation.
    ///
    /// # Errors
    ///
    /// See `handle_turn`; additionally `NoPendingQuestion` for stray answers.
    pub async fn submit_answer(&mut self, raw: &str) -> Result<TurnAction, TurnError> {
        if !self.state.is_active() {
            return Ok(TurnAction::Idle);
        }
        if self.state.is_complete() {
            return self.finish().await;
        }
        if self.state.current_question().is_none() {
            return Err(TurnError::NoPendingQuestion);
        }
        self.score_answer(raw)
    }

    /// External reset signal: deactivate the session without completing it.
    pub fn abandon(&mut self) {
        self.state.abandon();
    }

    async fn ask_next(&mut self) -> Result<TurnAction, TurnError> {
        let question = self
            .questions
            .generate(&self.topic, self.state.difficulty())
            .await?;
        self.state
            .place_question(question.clone())
            .map_err(|_| TurnError::InvalidState)?;
        Ok(TurnAction::Ask(question))
    }

    fn score_answer(&mut self, raw: &str) -> Result<TurnAction, TurnError> {
        let pending = self
            .state
            .current_question()
            .ok_or(TurnError::NoPendingQuestion)?;
        let answer = Answer::normalize(raw, pending.kind(), pending.options().len())?;

        let (question, outcome) = Oracle::grade(&mut self.state, &answer, self.clock.now())?;

        let current = self.state.difficulty();
        let next = self.adapter.propose(&self.state.outcome_history(), current);
        let shift = if next > current {
            Some(DifficultyShift::Raised(next))
        } else if next < current {
            Some(DifficultyShift::Lowered(next))
        } else {
            None
        };
        if shift.is_some() {
            self.state.set_difficulty(next);
        }

        Ok(TurnAction::Feedback(Feedback {
            outcome,
            question,
            shift,
        }))
    }

    async fn finish(&mut self) -> Result<TurnAction, TurnError> {
        let report = self.state.report();
        let narrative = self
            .summaries
            .summarize(&report)
            .await
            .map_err(TurnError::Summary)?;
        self.state
            .finish(self.clock.now())
            .map_err(|_| TurnError::InvalidState)?;

        // Re-read so the report carries the completion timestamp.
        Ok(TurnAction::Completed {
            narrative,
            report: self.state.report(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use quiz_core::model::{QuestionDraft, QuestionKind, QuizSettingsDraft};
    use quiz_core::time::fixed_clock;

    use crate::error::{GeneratorError, SummaryError};

    fn tf_question(prompt: &str) -> Question {
        QuestionDraft {
            kind: QuestionKind::TrueFalse,
            prompt: prompt.into(),
            options: Vec::new(),
            correct_answer: "true".into(),
            explanation: "From the source material.".into(),
        }
        .validate()
        .unwrap()
    }

    struct FixedSource;

    #[async_trait]
    impl QuestionSource for FixedSource {
        async fn generate(
            &self,
            _topic: &str,
            difficulty: Difficulty,
        ) -> Result<Question, GeneratorError> {
            Ok(tf_question(&format!("{difficulty} statement holds.")))
        }
    }

    struct FlakySource {
        failures_left: Mutex<u32>,
    }

    #[async_trait]
    impl QuestionSource for FlakySource {
        async fn generate(
            &self,
            _topic: &str,
            _difficulty: Difficulty,
        ) -> Result<Question, GeneratorError> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(GeneratorError::Unavailable);
            }
            Ok(tf_question("statement holds."))
        }
    }

    struct FixedSummary;

    #[async_trait]
    impl SummarySource for FixedSummary {
        async fn summarize(&self, report: &QuizReport) -> Result<String, SummaryError> {
            Ok(format!("{} of {}", report.score, report.max_score))
        }
    }

    struct FlakySummary {
        failures_left: Mutex<u32>,
    }

    #[async_trait]
    impl SummarySource for FlakySummary {
        async fn summarize(&self, _report: &QuizReport) -> Result<String, SummaryError> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(SummaryError::Unavailable);
            }
            Ok("done".into())
        }
    }

    fn engine_with(
        total: u32,
        questions: Arc<dyn QuestionSource>,
        summaries: Arc<dyn SummarySource>,
    ) -> QuizEngine {
        let settings = QuizSettingsDraft {
            total_questions: total,
            ..QuizSettingsDraft::default()
        }
        .validate()
        .unwrap();
        QuizEngine::start(settings, "finance", fixed_clock(), questions, summaries)
    }

    #[test]
    fn rules_fire_in_priority_order() {
        let settings = QuizSettingsDraft {
            total_questions: 1,
            ..QuizSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let mut state = QuizState::start(settings, quiz_core::time::fixed_now());

        // Rule 3 beats answer handling while nothing is pending.
        assert_eq!(plan(&state, "true"), TurnPlan::NeedQuestion);

        state.place_question(tf_question("Q")).unwrap();
        assert_eq!(plan(&state, ""), TurnPlan::AwaitAnswer);
        assert_eq!(plan(&state, " true "), TurnPlan::Answer("true".into()));

        state
            .complete_current(Outcome::Correct, quiz_core::time::fixed_now())
            .unwrap();
        // Rule 2 beats everything but inactivity once the total is reached.
        assert_eq!(plan(&state, "true"), TurnPlan::Finish);

        state.abandon();
        assert_eq!(plan(&state, "true"), TurnPlan::Idle);
    }

    #[tokio::test]
    async fn first_turn_asks_a_question() {
        let mut engine = engine_with(3, Arc::new(FixedSource), Arc::new(FixedSummary));
        let action = engine.handle_turn("").await.unwrap();
        assert!(matches!(action, TurnAction::Ask(_)));
        assert_eq!(engine.state().questions_asked(), 1);
        assert_eq!(engine.state().questions_answered(), 0);
    }

    #[tokio::test]
    async fn empty_input_reprompts_without_mutation() {
        let mut engine = engine_with(3, Arc::new(FixedSource), Arc::new(FixedSummary));
        engine.handle_turn("").await.unwrap();

        let action = engine.handle_turn("").await.unwrap();
        assert!(matches!(action, TurnAction::AwaitAnswer(_)));
        assert_eq!(engine.state().questions_asked(), 1);
    }

    #[tokio::test]
    async fn unrecognized_answer_keeps_question_pending() {
        let mut engine = engine_with(3, Arc::new(FixedSource), Arc::new(FixedSummary));
        engine.handle_turn("").await.unwrap();

        let err = engine.handle_turn("perhaps").await.unwrap_err();
        assert!(matches!(err, TurnError::Unrecognized(_)));
        assert!(engine.state().current_question().is_some());
        assert_eq!(engine.state().questions_answered(), 0);

        // Retry with a recognizable form succeeds.
        let action = engine.handle_turn("t").await.unwrap();
        assert!(matches!(
            action,
            TurnAction::Feedback(Feedback {
                outcome: Outcome::Correct,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn stray_answer_is_rejected_without_mutation() {
        let mut engine = engine_with(3, Arc::new(FixedSource), Arc::new(FixedSummary));
        let err = engine.submit_answer("true").await.unwrap_err();
        assert!(matches!(err, TurnError::NoPendingQuestion));
        assert_eq!(engine.state().questions_asked(), 0);
        assert_eq!(engine.state().questions_answered(), 0);
    }

    #[tokio::test]
    async fn generator_failure_leaves_state_retryable() {
        let source = Arc::new(FlakySource {
            failures_left: Mutex::new(1),
        });
        let mut engine = engine_with(3, source, Arc::new(FixedSummary));

        let err = engine.handle_turn("").await.unwrap_err();
        assert!(matches!(err, TurnError::Generator(_)));
        assert_eq!(engine.state().questions_asked(), 0);

        let action = engine.handle_turn("").await.unwrap();
        assert!(matches!(action, TurnAction::Ask(_)));
        assert_eq!(engine.state().questions_asked(), 1);
    }

    #[tokio::test]
    async fn feedback_announces_difficulty_shift() {
        let mut engine = engine_with(5, Arc::new(FixedSource), Arc::new(FixedSummary));

        engine.handle_turn("").await.unwrap();
        let first = engine.submit_answer("true").await.unwrap();
        let TurnAction::Feedback(feedback) = first else {
            panic!("expected feedback");
        };
        assert!(feedback.shift.is_none());

        engine.handle_turn("").await.unwrap();
        let second = engine.submit_answer("true").await.unwrap();
        let TurnAction::Feedback(feedback) = second else {
            panic!("expected feedback");
        };
        assert_eq!(
            feedback.shift,
            Some(DifficultyShift::Raised(Difficulty::Hard))
        );
        assert_eq!(engine.state().difficulty(), Difficulty::Hard);
    }

    #[tokio::test]
    async fn summary_failure_keeps_session_retryable() {
        let summaries = Arc::new(FlakySummary {
            failures_left: Mutex::new(1),
        });
        let mut engine = engine_with(1, Arc::new(FixedSource), summaries);

        engine.handle_turn("").await.unwrap();
        engine.submit_answer("false").await.unwrap();

        let err = engine.handle_turn("").await.unwrap_err();
        assert!(matches!(err, TurnError::Summary(_)));
        assert!(engine.state().is_active());
        assert_eq!(engine.state().questions_answered(), 1);

        let action = engine.handle_turn("").await.unwrap();
        assert!(matches!(action, TurnAction::Completed { .. }));
        assert!(!engine.state().is_active());
    }

    #[tokio::test]
    async fn abandoned_session_goes_idle() {
        let mut engine = engine_with(3, Arc::new(FixedSource), Arc::new(FixedSummary));
        engine.handle_turn("").await.unwrap();
        engine.abandon();

        let action = engine.handle_turn("true").await.unwrap();
        assert_eq!(action, TurnAction::Idle);
    }
}
