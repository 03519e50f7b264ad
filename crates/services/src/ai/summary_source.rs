use async_trait::async_trait;

use quiz_core::model::{Outcome, QuizReport};

use crate::ai::client::ChatClient;
use crate::error::SummaryError;
use crate::sources::SummarySource;

const SYSTEM_PROMPT: &str = "You are a study coach reviewing a finished quiz. Given the \
score and the per-question results, write a short encouraging summary that points out \
what went wrong and suggests areas of improvement. Plain text, at most two paragraphs.";

/// Session narration backed by a chat-completions model.
#[derive(Clone)]
pub struct LlmSummarySource {
    client: ChatClient,
}

impl LlmSummarySource {
    #[must_use]
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SummarySource for LlmSummarySource {
    async fn summarize(&self, report: &QuizReport) -> Result<String, SummaryError> {
        let rendered = render_report(report);
        let summary = self.client.complete(SYSTEM_PROMPT, &rendered).await?;
        Ok(summary)
    }
}

fn render_report(report: &QuizReport) -> String {
    let mut lines = vec![format!(
        "Score: {} of {} points ({} correct, {} incorrect, final difficulty {}).",
        report.score, report.max_score, report.correct, report.incorrect, report.final_difficulty
    )];
    for (index, entry) in report.entries.iter().enumerate() {
        let verdict = match entry.outcome {
            Outcome::Correct => "correct",
            Outcome::Incorrect => "incorrect",
        };
        lines.push(format!(
            "{}. [{verdict}] {} (answer: {})",
            index + 1,
            entry.prompt,
            entry.correct_answer
        ));
    }
    lines.join("\n")
}
