//! Shared error types for the services crate.

use thiserror::Error;

use attempt_core::model::{ChallengeSlug, DurationParseError, RouteError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors reported by a `SubmissionSink`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submission endpoint is not configured")]
    Disabled,
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Failure reported by a `Navigator`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("navigation failed: {message}")]
pub struct NavigationError {
    pub message: String,
}

impl NavigationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors emitted by the attempt timer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimerError {
    #[error("attempt timer is not running")]
    NotRunning,
    #[error("submission for {actual} does not belong to the attempt on {expected}")]
    ChallengeMismatch {
        expected: ChallengeSlug,
        actual: ChallengeSlug,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Errors emitted by the resume trigger.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResumeError {
    #[error("invalid prior elapsed time: {0}")]
    Duration(#[from] DurationParseError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Errors emitted while bootstrapping tracker services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Route(#[from] RouteError),
}
