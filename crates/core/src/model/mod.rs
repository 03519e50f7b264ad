mod answer;
mod ids;
mod outcome;
mod question;
mod session;
mod settings;

pub use answer::{Answer, AnswerParseError};
pub use ids::QuestionId;
pub use outcome::{AnswerLog, Outcome};
pub use question::{Question, QuestionDraft, QuestionError, QuestionKind};
pub use session::{QuizReport, QuizState, ReportEntry, StateError};
pub use settings::{QuizSettings, QuizSettingsDraft, SettingsError, DEFAULT_TOTAL_QUESTIONS};
