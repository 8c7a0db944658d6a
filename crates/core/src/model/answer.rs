use std::collections::{BTreeMap, BTreeSet};

use crate::model::ids::QuestionId;

/// Options offered for MCQ and MSQ questions.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Delimiter of the canonical MSQ encoding (`"A;C"`).
pub const MSQ_DELIMITER: char = ';';

/// Raw answers keyed by question. An absent key means "not answered".
pub type AnswerStore = BTreeMap<QuestionId, String>;

/// Absent, empty and whitespace-only answers all count as "not answered".
#[must_use]
pub fn is_blank(raw: Option<&str>) -> bool {
    raw.is_none_or(|value| value.trim().is_empty())
}

/// Comparison form shared by the candidate answer and the answer key.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Whether `label` is one of `OPTION_LABELS` (case-insensitive).
#[must_use]
pub fn is_option_label(label: &str) -> bool {
    let label = normalize(label);
    OPTION_LABELS.contains(&label.as_str())
}

//
// ─── MSQ SELECTION ─────────────────────────────────────────────────────────────
//

/// Ordered set of selected options for a multi-select question.
///
/// `encode` yields the canonical `;`-joined form that is compared verbatim
/// against the stored answer key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsqSelection(BTreeSet<String>);

impl MsqSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts any order, case, surrounding whitespace and duplicates.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(MSQ_DELIMITER)
                .map(normalize)
                .filter(|part| !part.is_empty())
                .collect(),
        )
    }

    /// Adds the option if absent, removes it if present.
    ///
    /// Anything outside `OPTION_LABELS` (including `;`-joined lists) is
    /// ignored and `false` is returned.
    pub fn toggle(&mut self, option: &str) -> bool {
        if !is_option_label(option) {
            return false;
        }
        let option = normalize(option);
        if !self.0.remove(&option) {
            self.0.insert(option);
        }
        true
    }

    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        self.0.contains(&normalize(option))
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let parts: Vec<&str> = self.0.iter().map(String::as_str).collect();
        parts.join(&MSQ_DELIMITER.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
