#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod sessions;

pub use exam_core::Clock;
pub use sessions as session;

pub use catalog::CatalogLoader;
pub use error::{CatalogLoadError, SessionError};

pub use sessions::{
    ExamRunner, ExamSessionService, RunnerConfig, SessionAction, SessionSnapshot, SessionTimer,
};
