use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use exam_core::model::{ExamCatalog, SubmitReason, Submission};
use exam_core::{Clock, ScoreReport};

use super::service::ExamSessionService;
use super::shared::{SessionCell, SharedSession, lock};
use super::snapshot::SessionSnapshot;
use super::timer::SessionTimer;
use crate::error::SessionError;

/// Runtime knobs for `ExamRunner`.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Wall-clock length of one countdown second.
    pub tick_period: Duration,
    pub clock: Clock,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            clock: Clock::default(),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Candidate input, as delivered by presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    GoTo(usize),
    UpdateAnswer(String),
    ToggleOption(String),
    SaveAndNext,
    MarkForReview,
    ClearResponse,
    Submit,
}

impl SessionAction {
    fn apply(self, session: &mut ExamSessionService) {
        match self {
            SessionAction::GoTo(index) => session.go_to_question(index),
            SessionAction::UpdateAnswer(value) => session.update_answer(value),
            SessionAction::ToggleOption(label) => session.toggle_option(&label),
            SessionAction::SaveAndNext => session.save_and_next(),
            SessionAction::MarkForReview => session.mark_for_review(),
            SessionAction::ClearResponse => session.clear_response(),
            SessionAction::Submit => {
                session.submit(SubmitReason::Manual);
            }
        }
    }
}

/// Runs one timed session: serializes candidate actions with countdown ticks
/// and publishes a snapshot after each change.
///
/// The countdown is cancelled when the runner is dropped.
pub struct ExamRunner {
    shared: SharedSession,
    timer: SessionTimer,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl ExamRunner {
    /// Start a session from `catalog` and begin the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidCatalog` if the catalog fails validation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(catalog: ExamCatalog, config: RunnerConfig) -> Result<Self, SessionError> {
        let session = ExamSessionService::from_catalog(catalog, config.clock)?;
        Ok(Self::from_session(session, config.tick_period))
    }

    /// Wrap an already-initialized session and begin its countdown.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn from_session(session: ExamSessionService, tick_period: Duration) -> Self {
        let (cell, snapshots) = SessionCell::new(session);
        let shared = Arc::new(Mutex::new(cell));
        let timer = SessionTimer::spawn(Arc::clone(&shared), tick_period);
        Self {
            shared,
            timer,
            snapshots,
        }
    }

    /// Apply a candidate action and return the resulting state.
    pub fn apply(&self, action: SessionAction) -> SessionSnapshot {
        let mut cell = lock(&self.shared);
        cell.update(|session| action.apply(session));
        cell.session.snapshot()
    }

    /// Manual submission. `None` if the session was already submitted.
    pub fn submit(&self) -> Option<Submission> {
        lock(&self.shared).update(|session| session.submit(SubmitReason::Manual))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every change, including each tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Resolves once the session is submitted, manually or by timeout.
    pub async fn submitted(&self) -> Option<Submission> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(SessionSnapshot::is_submitted).await.ok()?;
        snapshot.submission
    }

    /// Score report of the frozen session; `None` while still active.
    #[must_use]
    pub fn report(&self) -> Option<ScoreReport> {
        lock(&self.shared).session.report()
    }

    /// Cancel the countdown without submitting (leaving the session).
    pub fn stop_timer(&mut self) {
        self.timer.stop();
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }
}
