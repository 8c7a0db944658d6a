use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::shared::{SharedSession, lock};

/// Periodic countdown driver tied to one session.
///
/// Dropping the timer stops it. After `stop` returns no further tick reaches
/// the session, even if the task was already woken.
pub struct SessionTimer {
    shared: SharedSession,
    handle: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Spawn the tick task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn(shared: SharedSession, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        lock(&shared).set_ticking(true);

        let task_shared = Arc::clone(&shared);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let keep_ticking = lock(&task_shared).on_tick();
                if !keep_ticking {
                    break;
                }
            }
            tracing::debug!("session timer finished");
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Cancel the timer. Safe to call more than once.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        lock(&self.shared).set_ticking(false);
        handle.abort();
        tracing::debug!("session timer stopped");
    }

    /// Whether the tick task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
