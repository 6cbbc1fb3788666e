#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod resume;
pub mod submission;
pub mod timer;
pub mod tracker;

pub use attempt_core::Clock;

pub use app_services::TrackerServices;
pub use error::{AppServicesError, NavigationError, ResumeError, SubmissionError, TimerError};
pub use resume::{Navigator, ResumeTrigger, take_reused_solution};
pub use submission::{HttpSubmissionSink, SubmissionApiConfig, SubmissionFinalizer, SubmissionSink};
pub use timer::{AttemptTimer, ElapsedListener, MountKind, MountedAttempt, TimerState};
pub use tracker::{AttemptTracker, TrackerConfig};
