use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a question list cannot start a session.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has no questions")]
    Empty,

    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),

    #[error("question {id}: marks must be finite and >= 0, got {value}")]
    InvalidMarks { id: QuestionId, value: f64 },

    #[error("question {id}: negative marks must be finite and >= 0, got {value}")]
    InvalidNegativeMarks { id: QuestionId, value: f64 },

    #[error("exam duration must be at least one minute")]
    ZeroDuration,
}

/// Checks the invariants every session relies on.
///
/// # Errors
///
/// Returns the first `CatalogError` found, scanning in catalog order.
pub fn validate_questions(questions: &[Question]) -> Result<(), CatalogError> {
    if questions.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::with_capacity(questions.len());
    for q in questions {
        if !seen.insert(q.id) {
            return Err(CatalogError::DuplicateId(q.id));
        }
        if !q.marks.is_finite() || q.marks < 0.0 {
            return Err(CatalogError::InvalidMarks {
                id: q.id,
                value: q.marks,
            });
        }
        if !q.negative_marks.is_finite() || q.negative_marks < 0.0 {
            return Err(CatalogError::InvalidNegativeMarks {
                id: q.id,
                value: q.negative_marks,
            });
        }
    }
    Ok(())
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Exam paper as delivered by the ingestion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamCatalog {
    #[serde(rename = "examTitle", default)]
    pub title: String,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub questions: Vec<Question>,
}

impl ExamCatalog {
    /// Builds and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog fails `validate`.
    pub fn new(
        title: impl Into<String>,
        duration_minutes: u32,
        questions: Vec<Question>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            title: title.into(),
            duration_minutes,
            questions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::ZeroDuration` for a zero-minute exam, or any
    /// error from `validate_questions`.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.duration_minutes == 0 {
            return Err(CatalogError::ZeroDuration);
        }
        validate_questions(&self.questions)
    }

    /// Sum of positive marks across the catalog.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.marks).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
