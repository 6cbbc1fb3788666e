use crate::model::elapsed::ElapsedTime;

/// Decoded view of the four persisted attempt entries.
///
/// Decoding never fails. Missing or malformed numbers read as zero, and a zero
/// `start` counts as "no valid start".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptRecord {
    pub start_ms: Option<i64>,
    pub active: bool,
    pub time_spent: ElapsedTime,
    pub is_resumed: bool,
}

impl AttemptRecord {
    /// Build a record from the raw stored strings.
    #[must_use]
    pub fn decode(
        start: Option<&str>,
        active: Option<&str>,
        time_spent: Option<&str>,
        is_resumed: Option<&str>,
    ) -> Self {
        let start_ms = decode_millis(start);
        Self {
            start_ms: (start_ms > 0).then_some(start_ms),
            active: decode_flag(active),
            time_spent: ElapsedTime::from_millis(u64::try_from(decode_millis(time_spent)).unwrap_or(0)),
            is_resumed: decode_flag(is_resumed),
        }
    }

    /// Start of the running segment, if one is recorded.
    #[must_use]
    pub fn running_start(&self) -> Option<i64> {
        if self.active { self.start_ms } else { None }
    }

    /// True when no field carries any information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Single-use handoff from the resume trigger to the next timer mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeToken {
    baseline: ElapsedTime,
}

impl ResumeToken {
    #[must_use]
    pub fn new(baseline: ElapsedTime) -> Self {
        Self { baseline }
    }

    #[must_use]
    pub fn baseline(&self) -> ElapsedTime {
        self.baseline
    }
}

/// Parse a stored millisecond value; anything unparsable is zero.
#[must_use]
pub fn decode_millis(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

#[must_use]
pub fn decode_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.trim() == "true")
}

#[must_use]
pub fn encode_millis(value: i64) -> String {
    value.to_string()
}

#[must_use]
pub fn encode_flag(value: bool) -> String {
    if value { "true".into() } else { "false".into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_running_segment() {
        let record = AttemptRecord::decode(
            Some("1700000000000"),
            Some("true"),
            Some("5000"),
            None,
        );
        assert_eq!(record.running_start(), Some(1_700_000_000_000));
        assert_eq!(record.time_spent.as_millis(), 5_000);
        assert!(!record.is_resumed);
    }

    #[test]
    fn malformed_numbers_read_as_zero() {
        let record = AttemptRecord::decode(Some("soon"), Some("true"), Some("12.5s"), Some("true"));
        assert_eq!(record.start_ms, None);
        assert_eq!(record.running_start(), None);
        assert_eq!(record.time_spent, ElapsedTime::ZERO);
        assert!(record.is_resumed);
    }

    #[test]
    fn negative_time_spent_reads_as_zero() {
        let record = AttemptRecord::decode(None, None, Some("-40"), None);
        assert_eq!(record.time_spent, ElapsedTime::ZERO);
        assert!(record.is_empty());
    }

    #[test]
    fn inactive_segment_has_no_running_start() {
        let record = AttemptRecord::decode(Some("10"), Some("false"), None, None);
        assert_eq!(record.start_ms, Some(10));
        assert_eq!(record.running_start(), None);
    }

    #[test]
    fn flags_round_trip_through_strings() {
        assert!(decode_flag(Some(&encode_flag(true))));
        assert!(!decode_flag(Some(&encode_flag(false))));
        assert!(!decode_flag(Some("TRUE1")));
        assert_eq!(decode_millis(Some(&encode_millis(42))), 42);
    }
}
