use std::sync::Arc;
use std::time::Duration;

use attempt_core::model::{AttemptIdentity, AttemptRecord};
use storage::repository::KeyValueStore;
use storage::{AttemptStore, RawAttemptEntries};

use crate::Clock;
use crate::error::TimerError;
use crate::timer::{AttemptTimer, ElapsedListener, MountedAttempt};

/// Tunables for mounted attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub tick_period: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }
}

/// Entry point for the challenge page: mounts timers against the attempt store.
#[derive(Clone)]
pub struct AttemptTracker {
    clock: Clock,
    store: AttemptStore,
    config: TrackerConfig,
}

impl AttemptTracker {
    #[must_use]
    pub fn new(clock: Clock, attempts: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            store: AttemptStore::new(attempts),
            config: TrackerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Mount a ticking timer that publishes elapsed time to `listener`.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if initialization cannot read or write the store.
    pub async fn mount(
        &self,
        identity: AttemptIdentity,
        listener: ElapsedListener,
    ) -> Result<MountedAttempt, TimerError> {
        let timer = self.load_timer(identity).await?;
        Ok(MountedAttempt::start(timer, self.config.tick_period, listener))
    }

    /// Initialize a timer without a tick task, for callers that drive `tick` themselves.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if initialization cannot read or write the store.
    pub async fn load_timer(&self, identity: AttemptIdentity) -> Result<AttemptTimer, TimerError> {
        AttemptTimer::mount(identity, self.store.clone(), self.clock.clone()).await
    }

    /// Decoded record for diagnostics. Does not mount or consume anything.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be read.
    pub async fn inspect(&self, identity: &AttemptIdentity) -> Result<AttemptRecord, TimerError> {
        Ok(self.store.load(identity).await?)
    }

    /// Raw stored strings for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be read.
    pub async fn raw_entries(
        &self,
        identity: &AttemptIdentity,
    ) -> Result<RawAttemptEntries, TimerError> {
        Ok(self.store.raw_entries(identity).await?)
    }

    /// Manual escape hatch: clear a record without mounting it.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be cleared.
    pub async fn reset(&self, identity: &AttemptIdentity) -> Result<(), TimerError> {
        self.store.clear(identity).await?;
        tracing::info!(attempt = %identity, "attempt reset");
        Ok(())
    }
}
