use std::sync::Arc;

use exam_core::model::{
    AnswerStore, Question, QuestionStatus, SessionPhase, StatusCounts, StatusTracker, Submission,
};
use exam_core::time::format_countdown;

/// Read-only view of a session, published to presentation after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub title: String,
    pub questions: Arc<[Question]>,
    pub current_index: usize,
    pub answers: AnswerStore,
    pub status: StatusTracker,
    pub time_remaining: u32,
    pub phase: SessionPhase,
    pub submission: Option<Submission>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&str> {
        self.answers
            .get(&self.current_question().id)
            .map(String::as_str)
    }

    /// Palette entries in catalog order.
    pub fn palette(&self) -> impl Iterator<Item = (&Question, QuestionStatus)> + '_ {
        self.questions.iter().map(|q| {
            let status = self
                .status
                .get(&q.id)
                .copied()
                .unwrap_or(QuestionStatus::NotVisited);
            (q, status)
        })
    }

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(self.status.values())
    }

    #[must_use]
    pub fn countdown(&self) -> String {
        format_countdown(self.time_remaining)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }
}

#[cfg(test)]
mod tests {
    use crate::sessions::ExamSessionService;
    use exam_core::model::{Question, QuestionId, QuestionStatus, QuestionType};

    #[test]
    fn palette_follows_catalog_order() {
        let questions = vec![
            Question::new(QuestionId::new(7), QuestionType::Mcq, "A"),
            Question::new(QuestionId::new(2), QuestionType::Nat, "1"),
        ];
        let mut session = ExamSessionService::initialize(questions, 2).unwrap();
        session.update_answer("c");

        let snap = session.snapshot();
        let palette: Vec<_> = snap.palette().map(|(q, s)| (q.id.value(), s)).collect();
        assert_eq!(
            palette,
            vec![(7, QuestionStatus::NotAnswered), (2, QuestionStatus::NotVisited)]
        );
        assert_eq!(snap.current_answer(), Some("c"));
        assert_eq!(snap.countdown(), "02:00");
        assert!(!snap.is_submitted());
    }
}
