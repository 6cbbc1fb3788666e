use std::sync::Arc;

use async_trait::async_trait;
use attempt_core::model::{
    AttemptIdentity, ChallengeRoutes, ChallengeSlug, ElapsedTime, solution_key,
};
use storage::AttemptStore;
use storage::repository::{KeyValueStore, StorageError};
use url::Url;

use crate::error::{NavigationError, ResumeError};

/// Moves the learner to another page.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// # Errors
    ///
    /// Returns `NavigationError` if the target cannot be opened.
    async fn navigate(&self, target: &Url) -> Result<(), NavigationError>;
}

/// Seeds a resumable attempt from an earlier solution, then navigates to it.
#[derive(Clone)]
pub struct ResumeTrigger {
    attempts: AttemptStore,
    session: Arc<dyn KeyValueStore>,
    routes: ChallengeRoutes,
    navigator: Arc<dyn Navigator>,
}

impl ResumeTrigger {
    #[must_use]
    pub fn new(
        attempts: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        routes: ChallengeRoutes,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            attempts: AttemptStore::new(attempts),
            session,
            routes,
            navigator,
        }
    }

    /// Continue an earlier attempt that took `prior_elapsed` (`HH:MM:SS`).
    ///
    /// Everything that can fail before a write is checked first, so an invalid
    /// duration leaves both stores untouched. Navigation happens only after the
    /// store is seeded. Returns the URL navigated to.
    ///
    /// # Errors
    ///
    /// Returns `ResumeError::Duration` for a malformed duration,
    /// `ResumeError::Route` if the page URL cannot be built,
    /// `ResumeError::Storage` if seeding fails and `ResumeError::Navigation`
    /// if the navigator refuses the target.
    pub async fn resume(
        &self,
        identity: &AttemptIdentity,
        solution: &str,
        prior_elapsed: &str,
    ) -> Result<Url, ResumeError> {
        let baseline = ElapsedTime::from_hms(prior_elapsed)?;
        let target = self.routes.challenge(identity.challenge())?;

        self.session
            .set(&solution_key(identity.challenge()), solution)
            .await?;
        self.attempts.seed_resume(identity, baseline).await?;
        tracing::info!(
            attempt = %identity,
            baseline_ms = baseline.as_millis(),
            target = %target,
            "resuming earlier attempt"
        );

        self.navigator.navigate(&target).await?;
        Ok(target)
    }
}

/// Hand the reused solution to the challenge page, once.
///
/// # Errors
///
/// Returns `StorageError` if the session store cannot be read or written.
pub async fn take_reused_solution(
    session: &dyn KeyValueStore,
    challenge: &ChallengeSlug,
) -> Result<Option<String>, StorageError> {
    let key = solution_key(challenge);
    let solution = session.get(&key).await?;
    if solution.is_some() {
        session.remove(&key).await?;
    }
    Ok(solution)
}
