//! Collaborator interfaces the engine consumes.
//!
//! Content generation is external to the core: the engine only requires
//! something that can produce a consistent `Question` at a difficulty tier
//! and something that can narrate a finished session.

use async_trait::async_trait;

use quiz_core::Difficulty;
use quiz_core::model::{Question, QuizReport};

use crate::error::{GeneratorError, SummaryError};

/// Produces question content for a topic at the requested difficulty tier.
///
/// Implementations must return a `Question`, which is consistent by
/// construction: `QuestionDraft::validate` refuses correct answers that do
/// not normalize against the question's own kind and options.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Question, GeneratorError>;
}

/// Produces a natural-language performance narrative for a finished quiz.
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn summarize(&self, report: &QuizReport) -> Result<String, SummaryError>;
}
