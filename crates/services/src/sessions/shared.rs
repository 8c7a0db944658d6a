use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::service::ExamSessionService;
use super::snapshot::SessionSnapshot;

/// Session plus everything that must change atomically with it.
///
/// Candidate actions and timer ticks both go through this cell under one
/// lock, so a submit is checked and set in a single critical section.
pub(crate) struct SessionCell {
    pub(crate) session: ExamSessionService,
    snapshots: watch::Sender<SessionSnapshot>,
    ticking: bool,
}

pub(crate) type SharedSession = Arc<Mutex<SessionCell>>;

impl SessionCell {
    pub(crate) fn new(session: ExamSessionService) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (snapshots, rx) = watch::channel(session.snapshot());
        let cell = Self {
            session,
            snapshots,
            ticking: false,
        };
        (cell, rx)
    }

    /// Run a mutation and publish the resulting snapshot.
    pub(crate) fn update<R>(&mut self, f: impl FnOnce(&mut ExamSessionService) -> R) -> R {
        let out = f(&mut self.session);
        self.publish();
        out
    }

    pub(crate) fn set_ticking(&mut self, ticking: bool) {
        self.ticking = ticking;
    }

    /// Apply one timer tick. Returns whether the timer should keep going.
    pub(crate) fn on_tick(&mut self) -> bool {
        if !self.ticking || self.session.is_submitted() {
            return false;
        }
        if let Some(submission) = self.session.tick() {
            tracing::info!(reason = %submission.reason, "countdown expired");
        }
        self.publish();
        !self.session.is_submitted()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

/// Lock the cell, recovering the state if a previous holder panicked.
pub(crate) fn lock(shared: &SharedSession) -> MutexGuard<'_, SessionCell> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
