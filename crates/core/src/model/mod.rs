pub mod answer;
mod catalog;
pub mod ids;
mod question;
mod session;
mod status;

pub use answer::{AnswerStore, MsqSelection, OPTION_LABELS};
pub use catalog::{CatalogError, ExamCatalog, validate_questions};
pub use ids::QuestionId;
pub use question::{ContentRef, Question, QuestionType};
pub use session::{SessionPhase, SubmitReason, Submission};
pub use status::{QuestionStatus, StatusCounts, StatusTracker};
