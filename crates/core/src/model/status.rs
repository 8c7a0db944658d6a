use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::ids::QuestionId;

/// Palette state of a question.
///
/// `NotVisited` holds exactly until the candidate first lands on the question;
/// no transition ever leads back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotVisited,
    NotAnswered,
    Answered,
    Marked,
    MarkedAnswered,
}

/// Status per question, seeded for every catalog entry.
pub type StatusTracker = BTreeMap<QuestionId, QuestionStatus>;

impl QuestionStatus {
    /// Status written by "save & next".
    #[must_use]
    pub fn saved(has_answer: bool) -> Self {
        if has_answer {
            Self::Answered
        } else {
            Self::NotAnswered
        }
    }

    /// Status written by "mark for review & next".
    #[must_use]
    pub fn marked(has_answer: bool) -> Self {
        if has_answer {
            Self::MarkedAnswered
        } else {
            Self::Marked
        }
    }

    /// Landing on a question promotes `NotVisited` and leaves anything else alone.
    #[must_use]
    pub fn visited(self) -> Self {
        match self {
            Self::NotVisited => Self::NotAnswered,
            other => other,
        }
    }

    #[must_use]
    pub fn is_marked(self) -> bool {
        matches!(self, Self::Marked | Self::MarkedAnswered)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotVisited => "not_visited",
            Self::NotAnswered => "not_answered",
            Self::Answered => "answered",
            Self::Marked => "marked",
            Self::MarkedAnswered => "marked_answered",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Legend counts for the question palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub not_visited: usize,
    pub not_answered: usize,
    pub answered: usize,
    pub marked: usize,
    pub marked_answered: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn tally<'a>(statuses: impl IntoIterator<Item = &'a QuestionStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                QuestionStatus::NotVisited => counts.not_visited += 1,
                QuestionStatus::NotAnswered => counts.not_answered += 1,
                QuestionStatus::Answered => counts.answered += 1,
                QuestionStatus::Marked => counts.marked += 1,
                QuestionStatus::MarkedAnswered => counts.marked_answered += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.not_visited + self.not_answered + self.answered + self.marked + self.marked_answered
    }
}
