//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AnswerParseError, QuestionError};

/// Errors from the chat-completions client shared by the LLM collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    #[error("ai backend is not configured")]
    Disabled,
    #[error("ai backend returned an empty response")]
    EmptyResponse,
    #[error("ai request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors from the question generation collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("question generator is not available")]
    Unavailable,
    #[error("question generator returned an empty response")]
    EmptyResponse,
    #[error("question generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question generator returned malformed output: {reason}")]
    Malformed { reason: String },
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors from the summary collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("summary generator is not available")]
    Unavailable,
    #[error("summary generator returned an empty response")]
    EmptyResponse,
    #[error("summary generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<ChatError> for GeneratorError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Disabled => GeneratorError::Unavailable,
            ChatError::EmptyResponse => GeneratorError::EmptyResponse,
            ChatError::HttpStatus(status) => GeneratorError::HttpStatus(status),
            ChatError::Http(err) => GeneratorError::Http(err),
        }
    }
}

impl From<ChatError> for SummaryError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Disabled => SummaryError::Unavailable,
            ChatError::EmptyResponse => SummaryError::EmptyResponse,
            ChatError::HttpStatus(status) => SummaryError::HttpStatus(status),
            ChatError::Http(err) => SummaryError::Http(err),
        }
    }
}

/// Per-turn errors from the quiz engine.
///
/// Every variant leaves the session state exactly as it was before the turn;
/// the caller may retry the same turn.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TurnError {
    /// A scoring operation was attempted against a state that does not
    /// satisfy its precondition.
    #[error("operation requires a pending question")]
    InvalidState,

    /// An answer arrived while no question was outstanding.
    #[error("no question is awaiting an answer")]
    NoPendingQuestion,

    /// The answer matched none of the accepted forms; the question stays
    /// pending and does not count as an attempt.
    #[error(transparent)]
    Unrecognized(#[from] AnswerParseError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("summary generation failed: {0}")]
    Summary(#[source] SummaryError),
}
