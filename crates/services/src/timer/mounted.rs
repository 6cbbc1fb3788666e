use std::sync::Arc;
use std::time::Duration;

use attempt_core::model::{ElapsedTime, Submission, SubmissionDraft};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::machine::{AttemptTimer, TimerState};
use crate::error::TimerError;
use crate::submission::SubmissionSink;

/// Receives every published elapsed-time value.
pub type ElapsedListener = Arc<dyn Fn(ElapsedTime) + Send + Sync>;

/// A mounted attempt: the timer plus the task that ticks it.
///
/// Dropping or unmounting cancels the tick task. The persisted record is left
/// as it is, so the next mount picks the attempt up again.
pub struct MountedAttempt {
    timer: Arc<Mutex<AttemptTimer>>,
    ticker: Option<JoinHandle<()>>,
}

impl MountedAttempt {
    /// Must be called from within a Tokio runtime.
    pub(crate) fn start(timer: AttemptTimer, period: Duration, listener: ElapsedListener) -> Self {
        let timer = Arc::new(Mutex::new(timer));
        let ticker = spawn_ticker(Arc::clone(&timer), period, listener);
        Self {
            timer,
            ticker: Some(ticker),
        }
    }

    pub async fn elapsed(&self) -> ElapsedTime {
        self.timer.lock().await.elapsed()
    }

    pub async fn state(&self) -> TimerState {
        self.timer.lock().await.state()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Finalize through `sink`; the tick task stops once the attempt is submitted.
    ///
    /// The timer is not locked while the sink runs, so the display keeps
    /// ticking during a slow submission.
    ///
    /// # Errors
    ///
    /// See `AttemptTimer::finalize`. On error the attempt keeps ticking.
    pub async fn submit(
        &mut self,
        draft: SubmissionDraft,
        sink: &dyn SubmissionSink,
    ) -> Result<Submission, TimerError> {
        let submission = self.timer.lock().await.prepare_submission(draft)?;

        if let Err(err) = sink.submit(&submission).await {
            self.timer.lock().await.report_rejected(&submission, &err);
            return Err(err.into());
        }

        self.timer
            .lock()
            .await
            .complete_submission(&submission)
            .await?;
        self.stop_ticker();
        Ok(submission)
    }

    /// Reset the attempt and stop ticking.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be cleared.
    pub async fn reset(&mut self) -> Result<(), TimerError> {
        self.timer.lock().await.reset().await?;
        self.stop_ticker();
        Ok(())
    }

    /// Stop ticking without touching the persisted record.
    pub fn unmount(mut self) {
        self.stop_ticker();
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for MountedAttempt {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn spawn_ticker(
    timer: Arc<Mutex<AttemptTimer>>,
    period: Duration,
    listener: ElapsedListener,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            // The first tick completes immediately, publishing the mount value.
            interval.tick().await;
            let published = timer.lock().await.tick();
            match published {
                Some(elapsed) => listener(elapsed),
                None => break,
            }
        }
    })
}
