//! Time utilities with a clock abstraction for testability.
//!
//! All timestamps in the chat engine are UTC; the wire format carries them
//! as RFC 3339 strings (the `ts` field of a message).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing.
pub trait Clock: Send + Sync {
    /// Get the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed instant).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock from a Unix timestamp in milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self {
            fixed_time: Utc
                .timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Format an instant as an RFC 3339 string with millisecond precision
/// and a `Z` suffix, the representation used on the wire.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_increasing_instants() {
        // given:
        let clock = SystemClock;

        // when:
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = clock.now();

        // then:
        assert!(second >= first);
    }

    #[test]
    fn test_fixed_clock_returns_fixed_instant() {
        // given:
        let clock = FixedClock::from_millis(1_234_567_890_123);

        // when:
        let first = clock.now();
        let second = clock.now();

        // then:
        assert_eq!(first, second);
        assert_eq!(first.timestamp_millis(), 1_234_567_890_123);
    }

    #[test]
    fn test_format_ts_is_rfc3339_utc() {
        // given: 2023-01-01 00:00:00.123 UTC
        let ts = Utc.timestamp_millis_opt(1_672_531_200_123).single().unwrap();

        // when:
        let formatted = format_ts(ts);

        // then:
        assert_eq!(formatted, "2023-01-01T00:00:00.123Z");
    }
}
