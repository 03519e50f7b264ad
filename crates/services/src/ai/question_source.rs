use async_trait::async_trait;
use serde::Deserialize;

use quiz_core::Difficulty;
use quiz_core::model::{Question, QuestionDraft, QuestionKind};

use crate::ai::client::ChatClient;
use crate::error::GeneratorError;
use crate::sources::QuestionSource;

const SYSTEM_PROMPT: &str = "You are a quiz author. Reply with a single JSON object and \
nothing else, using these fields: \
\"kind\" (one of \"multiple_choice\", \"true_false\", \"yes_no\"), \
\"prompt\" (the question text), \
\"options\" (multiple choice only: exactly 4 option texts without letter prefixes), \
\"correct_answer\" (a letter a-d for multiple choice, otherwise \"true\"/\"false\" or \
\"yes\"/\"no\"), and \
\"explanation\" (one or two sentences shown after the answer is scored).";

/// Question generation backed by a chat-completions model.
#[derive(Clone)]
pub struct LlmQuestionSource {
    client: ChatClient,
}

impl LlmQuestionSource {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionSource for LlmQuestionSource {
    async fn generate(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Question, GeneratorError> {
        let user = format!("Topic: {topic}\nDifficulty: {difficulty}\nGenerate one quiz question now.");
        let raw = self.client.complete(SYSTEM_PROMPT, &user).await?;
        parse_question(&raw)
    }
}

/// Parse the model's reply into a validated `Question`. Tolerates a fenced
/// code block around the JSON, nothing more.
fn parse_question(raw: &str) -> Result<Question, GeneratorError> {
    let body = strip_code_fences(raw);
    let payload: QuestionPayload =
        serde_json::from_str(body).map_err(|err| GeneratorError::Malformed {
            reason: err.to_string(),
        })?;
    let question = QuestionDraft {
        kind: payload.kind,
        prompt: payload.prompt,
        options: payload.options,
        correct_answer: payload.correct_answer,
        explanation: payload.explanation,
    }
    .validate()?;
    Ok(question)
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    kind: QuestionKind,
    #[serde(alias = "question")]
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    explanation: String,
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
