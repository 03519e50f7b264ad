use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::Outcome;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty tier: {raw}")]
pub struct ParseDifficultyError {
    pub raw: String,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// The three ordered difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// One tier up, saturating at `Hard`.
    #[must_use]
    pub fn step_up(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One tier down, saturating at `Easy`.
    #[must_use]
    pub fn step_down(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_string() }),
        }
    }
}

//
// ─── ADAPTER ───────────────────────────────────────────────────────────────────
//

/// Proposes the next difficulty tier from the most recent scoring outcomes.
///
/// The adapter inspects exactly the last `window` outcomes (default 2): a
/// full streak of correct answers moves one tier up, a full streak of
/// incorrect answers moves one tier down, anything else leaves the tier
/// unchanged. It never looks further back and never moves more than one
/// tier per invocation, whatever the streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyAdapter {
    window: usize,
}

impl DifficultyAdapter {
    /// Window is validated upstream by `QuizSettings`; values below 2 are
    /// clamped defensively so the adapter itself stays total.
    #[must_use]
    pub fn new(window: u32) -> Self {
        Self {
            window: (window.max(2)) as usize,
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Pure proposal: `(history, current) -> next`.
    #[must_use]
    pub fn propose(&self, history: &[Outcome], current: Difficulty) -> Difficulty {
        if history.len() < self.window {
            return current;
        }
        let recent = &history[history.len() - self.window..];

        if recent.iter().all(|outcome| outcome.is_correct()) {
            current.step_up()
        } else if recent.iter().all(|outcome| !outcome.is_correct()) {
            current.step_down()
        } else {
            current
        }
    }
}

impl Default for DifficultyAdapter {
    fn default() -> Self {
        Self::new(2)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
