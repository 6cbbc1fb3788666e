use std::sync::Arc;

use attempt_core::model::{
    AttemptField, AttemptIdentity, AttemptRecord, ElapsedTime, ResumeToken, decode_flag,
    decode_millis, encode_flag, encode_millis,
};

use crate::repository::{KeyValueStore, StorageError};

/// Raw stored value of every attempt field, in `AttemptField::ALL` order.
pub type RawAttemptEntries = [(AttemptField, Option<String>); 4];

/// Typed access to the four persisted entries of an attempt.
#[derive(Clone)]
pub struct AttemptStore {
    kv: Arc<dyn KeyValueStore>,
}

impl AttemptStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read and decode the attempt record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read. Malformed values are
    /// not errors; they decode as zero.
    pub async fn load(&self, id: &AttemptIdentity) -> Result<AttemptRecord, StorageError> {
        let start = self.kv.get(&id.key(AttemptField::Start)).await?;
        let active = self.kv.get(&id.key(AttemptField::Active)).await?;
        let time_spent = self.kv.get(&id.key(AttemptField::TimeSpent)).await?;
        let is_resumed = self.kv.get(&id.key(AttemptField::IsResumed)).await?;

        Ok(AttemptRecord::decode(
            start.as_deref(),
            active.as_deref(),
            time_spent.as_deref(),
            is_resumed.as_deref(),
        ))
    }

    /// Raw strings as stored, for diagnostics and state comparisons.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn raw_entries(&self, id: &AttemptIdentity) -> Result<RawAttemptEntries, StorageError> {
        let mut entries = AttemptField::ALL.map(|field| (field, None));
        for (field, value) in &mut entries {
            *value = self.kv.get(&id.key(*field)).await?;
        }
        Ok(entries)
    }

    /// Record a new running segment starting at `start_ms`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either write fails.
    pub async fn begin_segment(&self, id: &AttemptIdentity, start_ms: i64) -> Result<(), StorageError> {
        self.kv
            .set(&id.key(AttemptField::Start), &encode_millis(start_ms))
            .await?;
        self.kv
            .set(&id.key(AttemptField::Active), &encode_flag(true))
            .await?;
        tracing::debug!(attempt = %id, start_ms, "segment started");
        Ok(())
    }

    /// Consume the one-shot resume marker.
    ///
    /// Returns the carried baseline the first time after a resume was seeded and
    /// `None` on every later call until the next seed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be read or cleared.
    pub async fn take_resume_token(
        &self,
        id: &AttemptIdentity,
    ) -> Result<Option<ResumeToken>, StorageError> {
        let flag_key = id.key(AttemptField::IsResumed);
        let flag = self.kv.get(&flag_key).await?;
        if !decode_flag(flag.as_deref()) {
            return Ok(None);
        }

        let time_spent = self.kv.get(&id.key(AttemptField::TimeSpent)).await?;
        let baseline = u64::try_from(decode_millis(time_spent.as_deref())).unwrap_or(0);
        self.kv.remove(&flag_key).await?;
        tracing::debug!(attempt = %id, baseline_ms = baseline, "resume token consumed");

        Ok(Some(ResumeToken::new(ElapsedTime::from_millis(baseline))))
    }

    /// Prepare the record so the next mount resumes with `baseline`.
    ///
    /// Writes `timeSpent` and `isResumed`, drops any stale `start` and marks the
    /// attempt active, in that order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any write fails.
    pub async fn seed_resume(
        &self,
        id: &AttemptIdentity,
        baseline: ElapsedTime,
    ) -> Result<(), StorageError> {
        let baseline_ms = i64::try_from(baseline.as_millis())
            .map_err(|_| StorageError::Serialization(format!("baseline overflow: {baseline}")))?;
        self.kv
            .set(&id.key(AttemptField::TimeSpent), &encode_millis(baseline_ms))
            .await?;
        self.kv
            .set(&id.key(AttemptField::IsResumed), &encode_flag(true))
            .await?;
        self.kv.remove(&id.key(AttemptField::Start)).await?;
        self.kv
            .set(&id.key(AttemptField::Active), &encode_flag(true))
            .await?;
        tracing::debug!(attempt = %id, baseline_ms, "resume seeded");
        Ok(())
    }

    /// Remove all four entries. Safe to call on an absent record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a removal fails.
    pub async fn clear(&self, id: &AttemptIdentity) -> Result<(), StorageError> {
        for key in id.keys() {
            self.kv.remove(&key).await?;
        }
        tracing::debug!(attempt = %id, "attempt record cleared");
        Ok(())
    }
}
