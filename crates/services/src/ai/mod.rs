//! LLM-backed collaborators speaking the OpenAI-compatible chat API.

mod client;
mod question_source;
mod summary_source;

pub use client::{AiConfig, ChatClient};
pub use question_source::LlmQuestionSource;
pub use summary_source::LlmSummarySource;
