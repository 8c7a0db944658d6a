mod service;
mod shared;
mod snapshot;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use service::ExamSessionService;
pub use snapshot::SessionSnapshot;
pub use timer::SessionTimer;
pub use workflow::{ExamRunner, RunnerConfig, SessionAction};
