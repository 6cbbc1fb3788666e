use attempt_core::Clock;
use attempt_core::model::{AttemptIdentity, ElapsedTime, Submission, SubmissionDraft};
use storage::AttemptStore;

use crate::error::{SubmissionError, TimerError};
use crate::submission::SubmissionSink;

/// Lifecycle of a timed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not tracking a persisted segment (anonymous, or after a reset).
    Uninitialized,
    /// A segment is running and elapsed time is live.
    Running,
    /// The attempt was submitted and its record cleared.
    Finalized,
}

/// In-memory view of the running segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start_ms: i64,
    baseline: ElapsedTime,
}

impl Segment {
    fn elapsed_at(self, now_ms: i64) -> ElapsedTime {
        ElapsedTime::between(self.start_ms, now_ms).saturating_add(self.baseline)
    }
}

/// Which initialization path a mount took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// No user: timing in memory only.
    Ephemeral,
    /// No prior record; a new segment was started.
    Fresh,
    /// A running segment was found; the attempt continues.
    Reloaded,
    /// A running segment was found together with an unconsumed resume marker.
    ReloadedResumed,
    /// A seeded resume started its first segment.
    Resumed,
}

/// Timer state machine for one attempt.
///
/// The store is written only at mount, finalization and reset. Ticking is a
/// pure recomputation from the in-memory segment.
pub struct AttemptTimer {
    identity: AttemptIdentity,
    store: AttemptStore,
    clock: Clock,
    state: TimerState,
    mount_kind: MountKind,
    segment: Option<Segment>,
    elapsed: ElapsedTime,
}

impl AttemptTimer {
    /// Mount the timer for `identity`, reconciling with whatever the store holds.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be read or the new
    /// segment cannot be written.
    pub async fn mount(
        identity: AttemptIdentity,
        store: AttemptStore,
        clock: Clock,
    ) -> Result<Self, TimerError> {
        let mut timer = Self {
            identity,
            store,
            clock,
            state: TimerState::Uninitialized,
            mount_kind: MountKind::Ephemeral,
            segment: None,
            elapsed: ElapsedTime::ZERO,
        };
        timer.initialize().await?;
        Ok(timer)
    }

    async fn initialize(&mut self) -> Result<(), TimerError> {
        let now = self.clock.now_millis();
        let id = &self.identity;

        if id.is_anonymous() {
            tracing::debug!(attempt = %id, "no user; timing in memory only");
            self.segment = Some(Segment {
                start_ms: now,
                baseline: ElapsedTime::ZERO,
            });
            self.mount_kind = MountKind::Ephemeral;
            self.elapsed = ElapsedTime::ZERO;
            return Ok(());
        }

        let record = self.store.load(id).await?;
        let token = if record.is_resumed {
            self.store.take_resume_token(id).await?
        } else {
            None
        };

        let (segment, kind) = match (record.running_start(), token) {
            (Some(start_ms), Some(token)) => (
                Segment {
                    start_ms,
                    baseline: token.baseline(),
                },
                MountKind::ReloadedResumed,
            ),
            // Ordinary reload: only the running segment counts.
            (Some(start_ms), None) => (
                Segment {
                    start_ms,
                    baseline: ElapsedTime::ZERO,
                },
                MountKind::Reloaded,
            ),
            (None, Some(token)) => {
                self.store.begin_segment(id, now).await?;
                (
                    Segment {
                        start_ms: now,
                        baseline: token.baseline(),
                    },
                    MountKind::Resumed,
                )
            }
            (None, None) => {
                self.store.clear(id).await?;
                self.store.begin_segment(id, now).await?;
                (
                    Segment {
                        start_ms: now,
                        baseline: ElapsedTime::ZERO,
                    },
                    MountKind::Fresh,
                )
            }
        };

        self.elapsed = segment.elapsed_at(now);
        self.segment = Some(segment);
        self.mount_kind = kind;
        self.state = TimerState::Running;
        tracing::debug!(
            attempt = %id,
            kind = ?kind,
            start_ms = segment.start_ms,
            baseline_ms = segment.baseline.as_millis(),
            elapsed_ms = self.elapsed.as_millis(),
            "attempt timer mounted"
        );
        Ok(())
    }

    #[must_use]
    pub fn identity(&self) -> &AttemptIdentity {
        &self.identity
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub fn mount_kind(&self) -> MountKind {
        self.mount_kind
    }

    /// Whether this timer reads and writes the attempt store.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        !self.identity.is_anonymous()
    }

    /// Last computed elapsed time.
    #[must_use]
    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    /// Elapsed time at `now_ms` without updating the published value.
    #[must_use]
    pub fn elapsed_at(&self, now_ms: i64) -> ElapsedTime {
        self.segment
            .map_or(ElapsedTime::ZERO, |segment| segment.elapsed_at(now_ms))
    }

    /// Recompute elapsed time from the clock.
    ///
    /// Returns `None` when no segment is being timed. Published values never
    /// decrease, even if the clock steps backwards.
    pub fn tick(&mut self) -> Option<ElapsedTime> {
        let segment = self.segment?;
        let now = self.clock.now_millis();
        self.elapsed = segment.elapsed_at(now).max(self.elapsed);
        Some(self.elapsed)
    }

    /// Submit the attempt and, once the sink accepted it, clear its record.
    ///
    /// A failing sink leaves both the store and this timer untouched so the
    /// attempt stays resumable. Dropping the returned future before the sink
    /// completes has the same effect.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::NotRunning` if no segment is being timed,
    /// `TimerError::ChallengeMismatch` if the draft names another challenge,
    /// `TimerError::Submission` if the sink fails and `TimerError::Storage` if
    /// the record cannot be cleared afterwards.
    pub async fn finalize(
        &mut self,
        draft: SubmissionDraft,
        sink: &dyn SubmissionSink,
    ) -> Result<Submission, TimerError> {
        let submission = self.prepare_submission(draft)?;
        if let Err(err) = sink.submit(&submission).await {
            self.report_rejected(&submission, &err);
            return Err(err.into());
        }
        self.complete_submission(&submission).await?;
        Ok(submission)
    }

    /// Build the submission record with the final elapsed time. Changes nothing.
    pub(super) fn prepare_submission(
        &self,
        draft: SubmissionDraft,
    ) -> Result<Submission, TimerError> {
        let segment = self.segment.ok_or(TimerError::NotRunning)?;
        if &draft.challenge != self.identity.challenge() {
            return Err(TimerError::ChallengeMismatch {
                expected: self.identity.challenge().clone(),
                actual: draft.challenge,
            });
        }

        let now = self.clock.now_millis();
        let final_elapsed = segment.elapsed_at(now).max(self.elapsed);
        Ok(Submission::from_draft(draft, final_elapsed))
    }

    pub(super) fn report_rejected(&self, submission: &Submission, err: &SubmissionError) {
        tracing::warn!(
            attempt = %self.identity,
            submission_id = %submission.submission_id,
            error = %err,
            "submission failed; attempt kept"
        );
    }

    /// Clear the record of an accepted submission and move to `Finalized`.
    pub(super) async fn complete_submission(
        &mut self,
        submission: &Submission,
    ) -> Result<(), TimerError> {
        if self.is_persisted() {
            self.store.clear(&self.identity).await?;
        }
        self.segment = None;
        self.elapsed = ElapsedTime::ZERO;
        self.state = TimerState::Finalized;
        tracing::info!(
            attempt = %self.identity,
            submission_id = %submission.submission_id,
            elapsed_ms = submission.time_spent_ms,
            "attempt finalized"
        );
        Ok(())
    }

    /// Forget the attempt: clear its record and the in-memory counters.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Storage` if the record cannot be cleared.
    pub async fn reset(&mut self) -> Result<(), TimerError> {
        if self.is_persisted() {
            self.store.clear(&self.identity).await?;
        }
        self.segment = None;
        self.elapsed = ElapsedTime::ZERO;
        self.state = TimerState::Uninitialized;
        tracing::info!(attempt = %self.identity, "attempt reset");
        Ok(())
    }
}
