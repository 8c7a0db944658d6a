use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a question within a catalog.
///
/// Ids are unique per catalog but need not be contiguous; navigation order
/// comes from catalog order, not from the id value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_display() {
        assert_eq!(QuestionId::new(42).to_string(), "42");
    }

    #[test]
    fn question_id_display_honours_width() {
        assert_eq!(format!("{:<4}|", QuestionId::new(7)), "7   |");
    }

    #[test]
    fn question_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&QuestionId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: QuestionId = serde_json::from_str("3").unwrap();
        assert_eq!(back, QuestionId::new(3));
    }
}
