use thiserror::Error;

use crate::adaptive::Difficulty;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invalid configuration detected at session creation. Never surfaces
/// mid-session: a `QuizSettings` value is valid by construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("total questions must be > 0")]
    InvalidTotalQuestions,

    #[error("points per correct answer must be > 0")]
    InvalidPoints,

    #[error("adaptation window must be at least 2 outcomes")]
    InvalidAdaptationWindow,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Default session length in questions.
pub const DEFAULT_TOTAL_QUESTIONS: u32 = 9;

/// Validated quiz session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    total_questions: u32,
    points_per_correct: u32,
    adaptation_window: u32,
    initial_difficulty: Difficulty,
}

/// Unvalidated configuration values supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettingsDraft {
    pub total_questions: u32,
    pub points_per_correct: u32,
    pub adaptation_window: u32,
    pub initial_difficulty: Difficulty,
}

impl Default for QuizSettingsDraft {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            points_per_correct: 1,
            adaptation_window: 2,
            initial_difficulty: Difficulty::Medium,
        }
    }
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into usable settings.
    ///
    /// A window below 2 would move difficulty on every single answer, which
    /// contradicts the consecutive-outcomes contract, so it is rejected.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` for any out-of-range value.
    pub fn validate(self) -> Result<QuizSettings, SettingsError> {
        if self.total_questions == 0 {
            return Err(SettingsError::InvalidTotalQuestions);
        }
        if self.points_per_correct == 0 {
            return Err(SettingsError::InvalidPoints);
        }
        if self.adaptation_window < 2 {
            return Err(SettingsError::InvalidAdaptationWindow);
        }

        Ok(QuizSettings {
            total_questions: self.total_questions,
            points_per_correct: self.points_per_correct,
            adaptation_window: self.adaptation_window,
            initial_difficulty: self.initial_difficulty,
        })
    }
}

impl QuizSettings {
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn points_per_correct(&self) -> u32 {
        self.points_per_correct
    }

    #[must_use]
    pub fn adaptation_window(&self) -> u32 {
        self.adaptation_window
    }

    #[must_use]
    pub fn initial_difficulty(&self) -> Difficulty {
        self.initial_difficulty
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            points_per_correct: 1,
            adaptation_window: 2,
            initial_difficulty: Difficulty::Medium,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
