use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use attempt_core::model::{Submission, SubmissionDraft};
use reqwest::Client;

use crate::error::{SubmissionError, TimerError};
use crate::timer::MountedAttempt;

/// Delivers a finalized submission to the grading backend.
///
/// Completion means the backend accepted the record. Retrying is the sink's
/// own business; the tracker calls it once per submit.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `SubmissionError` if the submission was not accepted.
    async fn submit(&self, submission: &Submission) -> Result<(), SubmissionError>;
}

/// Submit-time composition over a mounted attempt and a sink.
#[derive(Clone)]
pub struct SubmissionFinalizer {
    sink: Arc<dyn SubmissionSink>,
}

impl SubmissionFinalizer {
    #[must_use]
    pub fn new(sink: Arc<dyn SubmissionSink>) -> Self {
        Self { sink }
    }

    /// Finalize `attempt` with the measured elapsed time.
    ///
    /// # Errors
    ///
    /// Returns `TimerError` if the attempt is not running, the sink fails or the
    /// record cannot be cleared afterwards.
    pub async fn finalize(
        &self,
        attempt: &mut MountedAttempt,
        draft: SubmissionDraft,
    ) -> Result<Submission, TimerError> {
        attempt.submit(draft, self.sink.as_ref()).await
    }
}

#[derive(Clone, Debug)]
pub struct SubmissionApiConfig {
    pub base_url: String,
    pub token: Option<String>,
}

impl SubmissionApiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("BLOCKS_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let token = env::var("BLOCKS_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Some(Self { base_url, token })
    }
}

/// Posts submissions as JSON to `{base_url}/submissions`.
#[derive(Clone)]
pub struct HttpSubmissionSink {
    client: Client,
    config: Option<SubmissionApiConfig>,
}

impl HttpSubmissionSink {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(SubmissionApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<SubmissionApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl SubmissionSink for HttpSubmissionSink {
    async fn submit(&self, submission: &Submission) -> Result<(), SubmissionError> {
        let config = self.config.as_ref().ok_or(SubmissionError::Disabled)?;

        let url = format!("{}/submissions", config.base_url.trim_end_matches('/'));
        let mut request = self.client.post(url).json(submission);
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SubmissionError::HttpStatus(response.status()));
        }

        tracing::debug!(
            submission_id = %submission.submission_id,
            status = %response.status(),
            "submission delivered"
        );
        Ok(())
    }
}
