//! Offline collaborators used when no AI backend is configured.
//!
//! The bank serves hand-written finance questions, avoiding repeats within a
//! session until a tier is exhausted. Recycling beats refusing: a session
//! configured longer than a tier's supply still completes.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use quiz_core::Difficulty;
use quiz_core::model::{Outcome, Question, QuestionDraft, QuestionKind, QuizReport};

use crate::error::{GeneratorError, SummaryError};
use crate::sources::{QuestionSource, SummarySource};

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

struct BankEntry {
    difficulty: Difficulty,
    kind: QuestionKind,
    prompt: &'static str,
    options: &'static [&'static str],
    correct: &'static str,
    explanation: &'static str,
}

const BANK: &[BankEntry] = &[
    // Easy tier.
    BankEntry {
        difficulty: Difficulty::Easy,
        kind: QuestionKind::MultipleChoice,
        prompt: "Which financial statement reports a company's revenues and expenses over a period?",
        options: &[
            "Balance sheet",
            "Income statement",
            "Statement of shareholders' equity",
            "Auditor's report",
        ],
        correct: "b",
        explanation: "The income statement summarizes revenues and expenses to arrive at net income for the period.",
    },
    BankEntry {
        difficulty: Difficulty::Easy,
        kind: QuestionKind::TrueFalse,
        prompt: "A bond is a form of debt issued by a company or government.",
        options: &[],
        correct: "true",
        explanation: "Bonds are debt instruments: the issuer borrows from bondholders and repays with interest.",
    },
    BankEntry {
        difficulty: Difficulty::Easy,
        kind: QuestionKind::YesNo,
        prompt: "Does diversification reduce the risk of a portfolio?",
        options: &[],
        correct: "yes",
        explanation: "Spreading investments across assets lowers exposure to any single holding's losses.",
    },
    BankEntry {
        difficulty: Difficulty::Easy,
        kind: QuestionKind::MultipleChoice,
        prompt: "Which of these is the most liquid asset?",
        options: &["Real estate", "Machinery", "Cash", "Patents"],
        correct: "c",
        explanation: "Cash needs no conversion; every other asset must first be sold to pay obligations.",
    },
    // Medium tier.
    BankEntry {
        difficulty: Difficulty::Medium,
        kind: QuestionKind::MultipleChoice,
        prompt: "What does the price-to-earnings (P/E) ratio compare?",
        options: &[
            "Share price to book value",
            "Share price to earnings per share",
            "Dividends to total debt",
            "Revenue to total assets",
        ],
        correct: "b",
        explanation: "P/E divides the market price per share by earnings per share, showing what investors pay per unit of profit.",
    },
    BankEntry {
        difficulty: Difficulty::Medium,
        kind: QuestionKind::TrueFalse,
        prompt: "When market interest rates rise, the price of existing fixed-rate bonds rises too.",
        options: &[],
        correct: "false",
        explanation: "Bond prices move inversely to rates: higher new yields make older, lower coupons less attractive.",
    },
    BankEntry {
        difficulty: Difficulty::Medium,
        kind: QuestionKind::MultipleChoice,
        prompt: "The current ratio divides current assets by which figure?",
        options: &[
            "Total equity",
            "Current liabilities",
            "Net income",
            "Long-term debt",
        ],
        correct: "b",
        explanation: "Current assets over current liabilities gauges the ability to cover near-term obligations.",
    },
    BankEntry {
        difficulty: Difficulty::Medium,
        kind: QuestionKind::YesNo,
        prompt: "Are retained earnings part of shareholders' equity?",
        options: &[],
        correct: "yes",
        explanation: "Profits kept in the business accumulate in equity rather than being paid out as dividends.",
    },
    // Hard tier.
    BankEntry {
        difficulty: Difficulty::Hard,
        kind: QuestionKind::MultipleChoice,
        prompt: "The internal rate of return (IRR) of a project is the discount rate at which:",
        options: &[
            "Net present value equals zero",
            "Payback period equals one year",
            "Operating margin is maximized",
            "Cost of capital equals inflation",
        ],
        correct: "a",
        explanation: "IRR is defined as the rate that sets the project's net present value to zero.",
    },
    BankEntry {
        difficulty: Difficulty::Hard,
        kind: QuestionKind::TrueFalse,
        prompt: "In the CAPM, a stock with a beta above 1 is expected to be more volatile than the market.",
        options: &[],
        correct: "true",
        explanation: "Beta measures sensitivity to market moves; above 1 means amplified swings in both directions.",
    },
    BankEntry {
        difficulty: Difficulty::Hard,
        kind: QuestionKind::MultipleChoice,
        prompt: "Which measure best captures a bond's price sensitivity to interest rate changes?",
        options: &["Coupon rate", "Duration", "Par value", "Current yield"],
        correct: "b",
        explanation: "Duration approximates the percentage price change for a small change in yield.",
    },
    BankEntry {
        difficulty: Difficulty::Hard,
        kind: QuestionKind::YesNo,
        prompt: "Can a company report positive net income while its operating cash flow is negative?",
        options: &[],
        correct: "yes",
        explanation: "Accrual items such as receivables growth can lift income while cash collection lags behind.",
    },
];

/// Serves built-in questions at the requested tier, tracking which prompts a
/// session has already seen.
#[derive(Default)]
pub struct QuestionBank {
    served: Mutex<HashSet<&'static str>>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pick(&self, difficulty: Difficulty) -> Result<&'static BankEntry, GeneratorError> {
        let mut served = self
            .served
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let tier: Vec<&BankEntry> = BANK
            .iter()
            .filter(|entry| entry.difficulty == difficulty)
            .collect();
        let mut candidates: Vec<&BankEntry> = tier
            .iter()
            .copied()
            .filter(|entry| !served.contains(entry.prompt))
            .collect();

        if candidates.is_empty() {
            // Tier exhausted within the session. Recycle it.
            for entry in &tier {
                served.remove(entry.prompt);
            }
            candidates = tier;
        }

        let entry = candidates
            .choose(&mut rand::rng())
            .copied()
            .ok_or(GeneratorError::Unavailable)?;
        served.insert(entry.prompt);
        Ok(entry)
    }
}

#[async_trait]
impl QuestionSource for QuestionBank {
    async fn generate(
        &self,
        _topic: &str,
        difficulty: Difficulty,
    ) -> Result<Question, GeneratorError> {
        let entry = self.pick(difficulty)?;
        let question = QuestionDraft {
            kind: entry.kind,
            prompt: entry.prompt.to_string(),
            options: entry.options.iter().map(|option| (*option).to_string()).collect(),
            correct_answer: entry.correct.to_string(),
            explanation: entry.explanation.to_string(),
        }
        .validate()?;
        Ok(question)
    }
}

//
// ─── TEMPLATE SUMMARY ──────────────────────────────────────────────────────────
//

/// Deterministic summary used when no AI backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummary;

#[async_trait]
impl SummarySource for TemplateSummary {
    async fn summarize(&self, report: &QuizReport) -> Result<String, SummaryError> {
        let mut summary = format!(
            "You scored {} of {} points ({} of {} correct).",
            report.score, report.max_score, report.correct, report.answered
        );

        let missed: Vec<&str> = report
            .entries
            .iter()
            .filter(|entry| entry.outcome == Outcome::Incorrect)
            .map(|entry| entry.prompt.as_str())
            .collect();

        if missed.is_empty() {
            summary.push_str(" A clean run. Try a harder tier next time.");
        } else {
            summary.push_str("\n\nWorth revisiting:");
            for prompt in missed {
                summary.push_str("\n  * ");
                summary.push_str(prompt);
            }
        }

        Ok(summary)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
