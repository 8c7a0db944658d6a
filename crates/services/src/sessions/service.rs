use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use exam_core::model::answer::{self, AnswerStore, MsqSelection};
use exam_core::model::{
    CatalogError, ExamCatalog, Question, QuestionId, QuestionStatus, QuestionType, SessionPhase,
    StatusCounts, StatusTracker, SubmitReason, Submission, validate_questions,
};
use exam_core::{Clock, ScoreReport, scoring};

use super::snapshot::SessionSnapshot;
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory exam session: navigation, answers, palette status and countdown.
///
/// The service is the single writer of session state. Once submitted it is
/// frozen and every mutating call becomes a no-op.
pub struct ExamSessionService {
    title: String,
    questions: Arc<[Question]>,
    current: usize,
    answers: AnswerStore,
    status: StatusTracker,
    time_remaining: u32,
    phase: SessionPhase,
    submission: Option<Submission>,
    clock: Clock,
    started_at: DateTime<Utc>,
}

impl ExamSessionService {
    /// Start a session over `questions` with a countdown of `duration_minutes`.
    ///
    /// The first question counts as visited straight away.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidCatalog` if `questions` is empty, breaks
    /// a catalog invariant, or `duration_minutes` is zero (the same rules as
    /// `ExamCatalog::validate`).
    pub fn initialize(questions: Vec<Question>, duration_minutes: u32) -> Result<Self, SessionError> {
        Self::new(String::new(), questions, duration_minutes, Clock::default())
    }

    /// Start a session from a loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidCatalog` if the catalog fails validation.
    pub fn from_catalog(catalog: ExamCatalog, clock: Clock) -> Result<Self, SessionError> {
        catalog.validate()?;
        Self::new(catalog.title, catalog.questions, catalog.duration_minutes, clock)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidCatalog` if `questions` is empty,
    /// breaks a catalog invariant, or `duration_minutes` is zero.
    pub fn new(
        title: String,
        questions: Vec<Question>,
        duration_minutes: u32,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if duration_minutes == 0 {
            return Err(CatalogError::ZeroDuration.into());
        }
        validate_questions(&questions)?;

        let mut status: StatusTracker = questions
            .iter()
            .map(|q| (q.id, QuestionStatus::NotVisited))
            .collect();
        status.insert(questions[0].id, QuestionStatus::NotAnswered);

        let started_at = clock.now();
        tracing::info!(
            title = %title,
            questions = questions.len(),
            duration_minutes,
            "exam session started"
        );

        Ok(Self {
            title,
            questions: questions.into(),
            current: 0,
            answers: AnswerStore::new(),
            status,
            time_remaining: duration_minutes.saturating_mul(60),
            phase: SessionPhase::Active,
            submission: None,
            clock,
            started_at,
        })
    }

    //
    // ─── READ ACCESS ───────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    #[must_use]
    pub fn status_of(&self, id: QuestionId) -> Option<QuestionStatus> {
        self.status.get(&id).copied()
    }

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(self.status.values())
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    #[must_use]
    pub fn submission(&self) -> Option<Submission> {
        self.submission
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Owned copy of the observable state for presentation.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            title: self.title.clone(),
            questions: Arc::clone(&self.questions),
            current_index: self.current,
            answers: self.answers.clone(),
            status: self.status.clone(),
            time_remaining: self.time_remaining,
            phase: self.phase,
            submission: self.submission,
        }
    }

    /// Grade the frozen session. `None` while the session is still active.
    #[must_use]
    pub fn report(&self) -> Option<ScoreReport> {
        self.is_submitted()
            .then(|| scoring::score(&self.questions, &self.answers))
    }

    //
    // ─── CANDIDATE ACTIONS ─────────────────────────────────────────────────────
    //

    /// Move to `index`. Out-of-range indices are ignored.
    ///
    /// Both the question being left and the destination are promoted from
    /// `NotVisited` to `NotAnswered`.
    pub fn go_to_question(&mut self, index: usize) {
        if self.frozen("go_to_question") {
            return;
        }
        if index >= self.questions.len() {
            tracing::debug!(index, len = self.questions.len(), "ignoring out-of-range navigation");
            return;
        }

        let leaving = self.current_question().id;
        self.mark_visited(leaving);
        self.current = index;
        let arriving = self.current_question().id;
        self.mark_visited(arriving);
    }

    /// Store a raw answer for the current question. Status is left untouched
    /// until the candidate saves or marks.
    pub fn update_answer(&mut self, value: impl Into<String>) {
        if self.frozen("update_answer") {
            return;
        }
        let id = self.current_question().id;
        self.answers.insert(id, value.into());
    }

    /// Checkbox-style option selection.
    ///
    /// MSQ toggles `label` in the canonical encoding, MCQ replaces the answer,
    /// NAT ignores the call. Labels outside `OPTION_LABELS` are ignored.
    pub fn toggle_option(&mut self, label: &str) {
        if self.frozen("toggle_option") {
            return;
        }
        let Question { id, kind, .. } = *self.current_question();
        if !kind.uses_options() {
            tracing::debug!(question = %id, "option toggle ignored on numeric question");
            return;
        }
        if !answer::is_option_label(label) {
            tracing::debug!(question = %id, label, "ignoring unknown option");
            return;
        }

        if kind == QuestionType::Msq {
            let mut selection = MsqSelection::parse(self.answer(id).unwrap_or_default());
            selection.toggle(label);
            if selection.is_empty() {
                self.answers.remove(&id);
            } else {
                self.answers.insert(id, selection.encode());
            }
        } else {
            self.answers.insert(id, answer::normalize(label));
        }
    }

    /// Record the current answer as saved and move to the next question.
    pub fn save_and_next(&mut self) {
        if self.frozen("save_and_next") {
            return;
        }
        let id = self.current_question().id;
        let status = QuestionStatus::saved(self.has_answer(id));
        self.status.insert(id, status);
        self.advance();
    }

    /// Flag the current question for review and move to the next question.
    pub fn mark_for_review(&mut self) {
        if self.frozen("mark_for_review") {
            return;
        }
        let id = self.current_question().id;
        let status = QuestionStatus::marked(self.has_answer(id));
        self.status.insert(id, status);
        self.advance();
    }

    /// Drop the current answer and reset the question to `NotAnswered`,
    /// discarding any review mark.
    pub fn clear_response(&mut self) {
        if self.frozen("clear_response") {
            return;
        }
        let id = self.current_question().id;
        self.answers.remove(&id);
        self.status.insert(id, QuestionStatus::NotAnswered);
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Freeze the session.
    ///
    /// Returns the submission record on the `Active -> Submitted` transition
    /// and `None` on every later call.
    pub fn submit(&mut self, reason: SubmitReason) -> Option<Submission> {
        if self.is_submitted() {
            tracing::debug!(%reason, "session already submitted");
            return None;
        }
        let submission = Submission::new(reason, self.clock.now());
        self.phase = SessionPhase::Submitted;
        self.submission = Some(submission);
        tracing::info!(
            %reason,
            time_remaining = self.time_remaining,
            answered = self.answers.len(),
            "exam session submitted"
        );
        Some(submission)
    }

    /// One elapsed second. Reaching zero submits with `SubmitReason::Timeout`.
    pub fn tick(&mut self) -> Option<Submission> {
        if self.is_submitted() {
            return None;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            return self.submit(SubmitReason::Timeout);
        }
        None
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn frozen(&self, action: &'static str) -> bool {
        if self.is_submitted() {
            tracing::debug!(action, "ignoring action on submitted session");
        }
        self.is_submitted()
    }

    fn has_answer(&self, id: QuestionId) -> bool {
        !answer::is_blank(self.answer(id))
    }

    fn mark_visited(&mut self, id: QuestionId) {
        if let Some(status) = self.status.get_mut(&id) {
            *status = status.visited();
        }
    }

    fn advance(&mut self) {
        let next = self.current + 1;
        if next < self.questions.len() {
            self.go_to_question(next);
        }
    }
}

impl fmt::Debug for ExamSessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSessionService")
            .field("title", &self.title)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("time_remaining", &self.time_remaining)
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
