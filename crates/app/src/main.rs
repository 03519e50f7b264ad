use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use quiz_core::model::{Outcome, Question, QuestionKind, QuizSettings, QuizSettingsDraft};
use quiz_core::{Clock, Difficulty};
use services::ai::{ChatClient, LlmQuestionSource, LlmSummarySource};
use services::bank::{QuestionBank, TemplateSummary};
use services::{
    DifficultyShift, Feedback, QuestionSource, QuizEngine, SummarySource, TurnAction, TurnError,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestionCount { raw: String },
    InvalidDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestionCount { raw } => {
                write!(f, "invalid --questions value: {raw}")
            }
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw} (easy, medium, hard)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--topic <topic>] [--questions <n>] [--difficulty <tier>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --topic finance");
    eprintln!("  --questions 9");
    eprintln!("  --difficulty medium");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_TOPIC, QUIZ_TOTAL_QUESTIONS, QUIZ_DIFFICULTY");
    eprintln!("  QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL  (optional AI backend)");
}

struct Args {
    topic: String,
    settings: QuizSettings,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut topic = std::env::var("QUIZ_TOPIC").unwrap_or_else(|_| "finance".into());
        let mut draft = QuizSettingsDraft::default();

        if let Some(raw) = std::env::var("QUIZ_TOTAL_QUESTIONS").ok().filter(|raw| !raw.is_empty()) {
            draft.total_questions = raw
                .parse()
                .map_err(|_| ArgsError::InvalidQuestionCount { raw })?;
        }
        if let Some(raw) = std::env::var("QUIZ_DIFFICULTY").ok().filter(|raw| !raw.is_empty()) {
            draft.initial_difficulty = raw
                .parse::<Difficulty>()
                .map_err(|_| ArgsError::InvalidDifficulty { raw })?;
        }

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => {
                    topic = require_value(args, "--topic")?;
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    draft.total_questions = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuestionCount { raw: value.clone() })?;
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    draft.initial_difficulty = value
                        .parse::<Difficulty>()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg).into()),
            }
        }

        let settings = draft.validate()?;
        Ok(Self { topic, settings })
    }
}

/// Pick the collaborators: the AI backend when configured, the built-in bank
/// otherwise.
fn build_sources() -> (Arc<dyn QuestionSource>, Arc<dyn SummarySource>) {
    let client = ChatClient::from_env();
    if client.enabled() {
        (
            Arc::new(LlmQuestionSource::new(client.clone())),
            Arc::new(LlmSummarySource::new(client)),
        )
    } else {
        (Arc::new(QuestionBank::new()), Arc::new(TemplateSummary))
    }
}

fn render_question(question: &Question, number: u32, total: u32) {
    println!();
    println!("Question {number} of {total}: {}", question.prompt());
    match question.kind() {
        QuestionKind::MultipleChoice => {
            for (index, option) in question.options().iter().enumerate() {
                let letter = (b'a' + index as u8) as char;
                println!("  {letter}) {option}");
            }
        }
        QuestionKind::TrueFalse => println!("  (true / false)"),
        QuestionKind::YesNo => println!("  (yes / no)"),
    }
}

fn render_feedback(feedback: &Feedback) {
    match feedback.outcome {
        Outcome::Correct => println!("Correct! You got it right!"),
        Outcome::Incorrect => println!(
            "Incorrect! The correct answer is {}.",
            feedback.question.correct_answer()
        ),
    }
    if !feedback.question.explanation().is_empty() {
        println!("{}", feedback.question.explanation());
    }
    match feedback.shift {
        Some(DifficultyShift::Raised(_)) => println!("Let's try something a bit harder."),
        Some(DifficultyShift::Lowered(_)) => println!("Let's ease off a little."),
        None => {}
    }
}

fn read_line(prompt: &str) -> Result<Option<String>, std::io::Error> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let (questions, summaries) = build_sources();
    let total = args.settings.total_questions();
    let mut engine = QuizEngine::start(
        args.settings,
        args.topic.clone(),
        Clock::default_clock(),
        questions,
        summaries,
    );

    println!("Quiz on {}: {total} questions. Type quit to stop.", args.topic);

    loop {
        // Let the engine decide the turn: ask, re-prompt, or wrap up.
        match engine.handle_turn("").await {
            Ok(TurnAction::Ask(question) | TurnAction::AwaitAnswer(question)) => {
                render_question(&question, engine.state().questions_asked(), total);
            }
            Ok(TurnAction::Completed { narrative, report }) => {
                println!();
                println!("{narrative}");
                println!(
                    "Final score: {} of {} points.",
                    report.score, report.max_score
                );
                return Ok(());
            }
            Ok(TurnAction::Idle) => return Ok(()),
            Ok(TurnAction::Feedback(_)) => {
                // Unreachable with empty input; loop back to the ladder.
            }
            Err(err) => {
                eprintln!("{err}");
                return Err(err.into());
            }
        }

        // Collect an answer for the pending question, tolerating noise.
        loop {
            let Some(input) = read_line("> ")? else {
                engine.abandon();
                println!("Session abandoned.");
                return Ok(());
            };
            if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
                engine.abandon();
                println!("Session abandoned.");
                return Ok(());
            }
            if input.is_empty() {
                continue;
            }
            match engine.submit_answer(&input).await {
                Ok(TurnAction::Feedback(feedback)) => {
                    render_feedback(&feedback);
                    break;
                }
                Ok(_) => break,
                Err(TurnError::Unrecognized(err)) => {
                    println!("{err}. Try again.");
                }
                Err(err) => {
                    eprintln!("{err}");
                    return Err(err.into());
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
