//! Post-submission grading.
//!
//! `score` is a pure function of the catalog and the final answer store. It
//! never fails: malformed numeric input is graded as wrong.

use serde::Serialize;

use crate::model::answer::{self, AnswerStore};
use crate::model::{Question, QuestionId, QuestionType};

/// Shown in place of the candidate's answer when nothing was entered.
pub const NOT_ATTEMPTED: &str = "Not Attempted";

/// Absolute tolerance for numeric-answer questions.
pub const NAT_TOLERANCE: f64 = 0.01;

//
// ─── REPORT TYPES ──────────────────────────────────────────────────────────────
//

/// Grading outcome for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub question_id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub marks: f64,
    pub correct_answer: String,
    /// Raw candidate input, or `NOT_ATTEMPTED`.
    pub user_answer: String,
    pub is_attempted: bool,
    pub is_correct: bool,
    pub marks_awarded: f64,
}

/// Per-question analysis plus aggregates, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub analysis: Vec<AnalysisRecord>,
    pub total_score: f64,
    pub max_score: f64,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub attempted_count: usize,
    pub question_count: usize,
    /// Percentage of attempted questions answered correctly, one decimal.
    pub accuracy: f64,
}

impl ScoreReport {
    #[must_use]
    pub fn unattempted_count(&self) -> usize {
        self.question_count - self.attempted_count
    }

    #[must_use]
    pub fn record(&self, id: QuestionId) -> Option<&AnalysisRecord> {
        self.analysis.iter().find(|r| r.question_id == id)
    }
}

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

/// Whether an attempted answer matches the key.
///
/// NAT answers match on normalized string equality or when both sides parse
/// as finite numbers within `NAT_TOLERANCE`. MCQ and MSQ need an exact match
/// of the normalized (canonical) strings.
#[must_use]
pub fn is_correct(kind: QuestionType, user_answer: &str, correct_answer: &str) -> bool {
    let user = answer::normalize(user_answer);
    let key = answer::normalize(correct_answer);
    if user == key {
        return true;
    }
    match kind {
        QuestionType::Nat => match (parse_number(&user), parse_number(&key)) {
            (Some(u), Some(k)) => (u - k).abs() < NAT_TOLERANCE,
            _ => false,
        },
        QuestionType::Mcq | QuestionType::Msq => false,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Grades one question against the candidate's raw answer.
#[must_use]
pub fn grade(question: &Question, raw: Option<&str>) -> AnalysisRecord {
    let mut record = AnalysisRecord {
        question_id: question.id,
        kind: question.kind,
        marks: question.marks,
        correct_answer: question.correct_answer.clone(),
        user_answer: NOT_ATTEMPTED.to_owned(),
        is_attempted: false,
        is_correct: false,
        marks_awarded: 0.0,
    };

    let Some(raw) = raw.filter(|value| !answer::is_blank(Some(*value))) else {
        return record;
    };

    record.user_answer = raw.to_owned();
    record.is_attempted = true;
    record.is_correct = is_correct(question.kind, raw, &question.correct_answer);
    record.marks_awarded = if record.is_correct {
        question.marks
    } else {
        penalty(question)
    };
    record
}

// Only single-choice guesses are penalised.
fn penalty(question: &Question) -> f64 {
    match question.kind {
        QuestionType::Mcq if question.negative_marks > 0.0 => -question.negative_marks,
        _ => 0.0,
    }
}

/// Grades every question in catalog order and aggregates the result.
#[must_use]
pub fn score(questions: &[Question], answers: &AnswerStore) -> ScoreReport {
    let mut analysis = Vec::with_capacity(questions.len());
    let mut total_score = 0.0;
    let mut correct_count = 0;
    let mut wrong_count = 0;
    let mut attempted_count = 0;

    for question in questions {
        let record = grade(question, answers.get(&question.id).map(String::as_str));
        if record.is_attempted {
            attempted_count += 1;
            if record.is_correct {
                correct_count += 1;
            } else {
                wrong_count += 1;
            }
            total_score += record.marks_awarded;
        }
        analysis.push(record);
    }

    ScoreReport {
        analysis,
        total_score,
        max_score: questions.iter().map(|q| q.marks).sum(),
        correct_count,
        wrong_count,
        attempted_count,
        question_count: questions.len(),
        accuracy: accuracy(correct_count, attempted_count),
    }
}

#[allow(clippy::cast_precision_loss)]
fn accuracy(correct: usize, attempted: usize) -> f64 {
    if attempted == 0 {
        return 0.0;
    }
    let pct = correct as f64 / attempted as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, kind: QuestionType, key: &str) -> Question {
        Question::new(QuestionId::new(id), kind, key).with_marks(2.0, 0.66)
    }

    fn answers(pairs: &[(u64, &str)]) -> AnswerStore {
        pairs
            .iter()
            .map(|(id, value)| (QuestionId::new(*id), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn nat_within_tolerance_is_correct() {
        let q = question(1, QuestionType::Nat, "3.14");
        assert!(grade(&q, Some("3.141")).is_correct);
        assert!(!grade(&q, Some("3.2")).is_correct);
        assert!(grade(&q, Some(" 3.14 ")).is_correct);
    }

    #[test]
    fn nat_formatting_differences_are_absorbed() {
        let q = question(1, QuestionType::Nat, "3");
        assert!(grade(&q, Some("3.0")).is_correct);
        assert!(grade(&q, Some("3.00")).is_correct);
    }

    #[test]
    fn malformed_nat_is_wrong_without_penalty() {
        let q = question(1, QuestionType::Nat, "3.14");
        let record = grade(&q, Some("3.1.4"));
        assert!(record.is_attempted);
        assert!(!record.is_correct);
        assert_eq!(record.marks_awarded, 0.0);

        let record = grade(&q, Some("-"));
        assert!(!record.is_correct);
    }

    #[test]
    fn nat_numeric_prefix_is_not_a_number() {
        let q = question(1, QuestionType::Nat, "3.14");
        let record = grade(&q, Some("3.14abc"));
        assert!(record.is_attempted);
        assert!(!record.is_correct);
    }

    #[test]
    fn nat_non_numeric_key_still_matches_by_string() {
        let q = question(1, QuestionType::Nat, "abc");
        assert!(grade(&q, Some("ABC")).is_correct);
        assert!(!grade(&q, Some("1")).is_correct);
    }

    #[test]
    fn wrong_mcq_is_penalised_but_msq_is_not() {
        let mcq = question(1, QuestionType::Mcq, "B");
        let msq = question(2, QuestionType::Msq, "A;C");

        let r = grade(&mcq, Some("A"));
        assert!(!r.is_correct);
        assert_eq!(r.marks_awarded, -0.66);

        let r = grade(&msq, Some("A"));
        assert!(!r.is_correct);
        assert_eq!(r.marks_awarded, 0.0);
    }

    #[test]
    fn mcq_without_negative_marks_scores_plain_zero() {
        let q = question(1, QuestionType::Mcq, "B").with_marks(1.0, 0.0);
        let r = grade(&q, Some("C"));
        assert_eq!(r.marks_awarded, 0.0);
        assert!(r.marks_awarded.is_sign_positive());
    }

    #[test]
    fn msq_requires_exact_canonical_match() {
        let q = question(1, QuestionType::Msq, "A;C");
        assert!(grade(&q, Some("a;c")).is_correct);
        assert!(!grade(&q, Some("A")).is_correct);
        assert!(!grade(&q, Some("A;B;C")).is_correct);
    }

    #[test]
    fn blank_answers_are_not_attempted() {
        let q = question(1, QuestionType::Mcq, "A");
        for raw in [None, Some(""), Some("   ")] {
            let r = grade(&q, raw);
            assert!(!r.is_attempted);
            assert!(!r.is_correct);
            assert_eq!(r.user_answer, NOT_ATTEMPTED);
            assert_eq!(r.marks_awarded, 0.0);
        }
    }

    #[test]
    fn score_aggregates_in_catalog_order() {
        let questions = vec![
            question(3, QuestionType::Mcq, "A"),
            question(1, QuestionType::Mcq, "B"),
            question(2, QuestionType::Msq, "A;D"),
            question(9, QuestionType::Nat, "10"),
        ];
        let store = answers(&[(3, "A"), (1, "C"), (2, "A;D"), (9, "")]);

        let report = score(&questions, &store);

        let ids: Vec<u64> = report.analysis.iter().map(|r| r.question_id.value()).collect();
        assert_eq!(ids, vec![3, 1, 2, 9]);
        assert_eq!(report.attempted_count, 3);
        assert_eq!(report.correct_count, 2);
        assert_eq!(report.wrong_count, 1);
        assert_eq!(report.unattempted_count(), 1);
        assert!((report.total_score - (2.0 + 2.0 - 0.66)).abs() < 1e-9);
        assert_eq!(report.max_score, 8.0);
        assert_eq!(report.accuracy, 66.7);
        assert_eq!(report.record(QuestionId::new(9)).unwrap().user_answer, NOT_ATTEMPTED);
    }

    #[test]
    fn accuracy_is_zero_without_attempts() {
        let questions = vec![question(1, QuestionType::Mcq, "A")];
        let report = score(&questions, &AnswerStore::new());
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.total_score, 0.0);
    }

    #[test]
    fn scoring_is_repeatable() {
        let questions = vec![question(1, QuestionType::Mcq, "A")];
        let store = answers(&[(1, "B")]);
        assert_eq!(score(&questions, &store), score(&questions, &store));
    }

    #[test]
    fn report_serializes_camel_case() {
        let questions = vec![question(1, QuestionType::Nat, "2.5")];
        let report = score(&questions, &answers(&[(1, "2.5")]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["correctCount"], 1);
        assert_eq!(json["analysis"][0]["type"], "NAT");
        assert_eq!(json["analysis"][0]["marksAwarded"], 2.0);
        assert_eq!(json["analysis"][0]["isCorrect"], true);
    }
}
