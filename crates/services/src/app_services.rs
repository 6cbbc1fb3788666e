use std::sync::Arc;

use attempt_core::model::{ChallengeRoutes, ChallengeSlug};
use storage::repository::{KeyValueStore, Storage, StorageError};

use crate::Clock;
use crate::error::AppServicesError;
use crate::resume::{Navigator, ResumeTrigger, take_reused_solution};
use crate::submission::{SubmissionFinalizer, SubmissionSink};
use crate::tracker::{AttemptTracker, TrackerConfig};

/// Assembles the tracker-facing services over one `Storage`.
#[derive(Clone)]
pub struct TrackerServices {
    tracker: Arc<AttemptTracker>,
    resume: Arc<ResumeTrigger>,
    finalizer: Arc<SubmissionFinalizer>,
    session: Arc<dyn KeyValueStore>,
}

impl TrackerServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the site
    /// URL is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        site_url: &str,
        clock: Clock,
        config: TrackerConfig,
        navigator: Arc<dyn Navigator>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Result<Self, AppServicesError> {
        let routes = ChallengeRoutes::new(site_url)?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(
            &storage, routes, clock, config, navigator, sink,
        ))
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        routes: ChallengeRoutes,
        clock: Clock,
        config: TrackerConfig,
        navigator: Arc<dyn Navigator>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        let tracker = Arc::new(
            AttemptTracker::new(clock, Arc::clone(&storage.attempts)).with_config(config),
        );
        let resume = Arc::new(ResumeTrigger::new(
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.session),
            routes,
            navigator,
        ));
        let finalizer = Arc::new(SubmissionFinalizer::new(sink));

        Self {
            tracker,
            resume,
            finalizer,
            session: Arc::clone(&storage.session),
        }
    }

    #[must_use]
    pub fn tracker(&self) -> Arc<AttemptTracker> {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn resume(&self) -> Arc<ResumeTrigger> {
        Arc::clone(&self.resume)
    }

    #[must_use]
    pub fn finalizer(&self) -> Arc<SubmissionFinalizer> {
        Arc::clone(&self.finalizer)
    }

    /// Reused solution waiting for `challenge`, consumed on read.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session store fails.
    pub async fn take_reused_solution(
        &self,
        challenge: &ChallengeSlug,
    ) -> Result<Option<String>, StorageError> {
        take_reused_solution(self.session.as_ref(), challenge).await
    }
}
