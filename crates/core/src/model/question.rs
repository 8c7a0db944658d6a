use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// How a question is answered and graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Single choice from the option set.
    #[serde(rename = "MCQ")]
    Mcq,
    /// Any subset of the option set, graded on an exact match.
    #[serde(rename = "MSQ")]
    Msq,
    /// Free numeric entry, graded with a small tolerance.
    #[serde(rename = "NAT")]
    Nat,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Msq => "MSQ",
            QuestionType::Nat => "NAT",
        }
    }

    /// Whether the answer is picked from `OPTION_LABELS`.
    #[must_use]
    pub fn uses_options(self) -> bool {
        matches!(self, QuestionType::Mcq | QuestionType::Msq)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

//
// ─── CONTENT REFERENCE ─────────────────────────────────────────────────────────
//

/// Opaque handle to the displayable body of a question (usually an image URI).
///
/// The session never interprets it; presentation resolves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

const DEFAULT_MARKS: f64 = 1.0;

fn default_marks() -> f64 {
    DEFAULT_MARKS
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default = "default_marks")]
    pub marks: f64,
    #[serde(default)]
    pub negative_marks: f64,
    #[serde(rename = "imagePath", default)]
    pub content: ContentRef,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, kind: QuestionType, correct_answer: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            correct_answer: correct_answer.into(),
            marks: DEFAULT_MARKS,
            negative_marks: 0.0,
            content: ContentRef::default(),
        }
    }

    #[must_use]
    pub fn with_marks(mut self, marks: f64, negative_marks: f64) -> Self {
        self.marks = marks;
        self.negative_marks = negative_marks;
        self
    }
}
