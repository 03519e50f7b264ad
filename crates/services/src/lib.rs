#![forbid(unsafe_code)]

pub mod ai;
pub mod bank;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod sources;

pub use quiz_core::Clock;

pub use engine::{DifficultyShift, Feedback, QuizEngine, TurnAction};
pub use error::{ChatError, GeneratorError, SummaryError, TurnError};
pub use oracle::Oracle;
pub use sources::{QuestionSource, SummarySource};
