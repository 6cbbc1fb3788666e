use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MILLIS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

/// Errors raised while parsing an `HH:MM:SS` duration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DurationParseError {
    #[error("expected HH:MM:SS, got {raw:?}")]
    Format { raw: String },

    #[error("non-numeric {component} component in {raw:?}")]
    NonNumeric {
        raw: String,
        component: &'static str,
    },

    #[error("duration {raw:?} is too large")]
    Overflow { raw: String },
}

/// Elapsed time of an attempt with millisecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime(0);

    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Time between `start_ms` and `now_ms`; a start in the future yields zero.
    #[must_use]
    pub fn between(start_ms: i64, now_ms: i64) -> Self {
        let delta = now_ms.saturating_sub(start_ms);
        Self(u64::try_from(delta).unwrap_or(0))
    }

    #[must_use]
    pub fn saturating_add(self, other: ElapsedTime) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parse a `HH:MM:SS` duration.
    ///
    /// Each component must be one or more ASCII digits. Hours are unbounded and
    /// minutes/seconds are not range checked, so `"00:90:00"` is ninety minutes.
    ///
    /// # Errors
    ///
    /// Returns `DurationParseError::Format` when there are not exactly three
    /// components, `NonNumeric` when a component is empty or not all digits,
    /// and `Overflow` when the total does not fit in milliseconds.
    pub fn from_hms(raw: &str) -> Result<Self, DurationParseError> {
        let parts: Vec<&str> = raw.trim().split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(DurationParseError::Format { raw: raw.to_owned() });
        };

        let hours = parse_component(raw, hours, "hours")?;
        let minutes = parse_component(raw, minutes, "minutes")?;
        let seconds = parse_component(raw, seconds, "seconds")?;

        let overflow = || DurationParseError::Overflow { raw: raw.to_owned() };
        let total_seconds = hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|h| minutes.checked_mul(SECONDS_PER_MINUTE).map(|m| (h, m)))
            .and_then(|(h, m)| h.checked_add(m))
            .and_then(|hm| hm.checked_add(seconds))
            .ok_or_else(overflow)?;
        let millis = total_seconds
            .checked_mul(MILLIS_PER_SECOND)
            .ok_or_else(overflow)?;

        Ok(Self(millis))
    }

    /// Format as `HH:MM:SS`, truncating sub-second precision.
    #[must_use]
    pub fn to_hms(self) -> String {
        let total_seconds = self.0 / MILLIS_PER_SECOND;
        let hours = total_seconds / SECONDS_PER_HOUR;
        let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
        let seconds = total_seconds % SECONDS_PER_MINUTE;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

fn parse_component(
    raw: &str,
    component: &str,
    name: &'static str,
) -> Result<u64, DurationParseError> {
    let non_numeric = || DurationParseError::NonNumeric {
        raw: raw.to_owned(),
        component: name,
    };
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(non_numeric());
    }
    component
        .parse::<u64>()
        .map_err(|_| DurationParseError::Overflow { raw: raw.to_owned() })
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hms())
    }
}

impl FromStr for ElapsedTime {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hms(s)
    }
}
