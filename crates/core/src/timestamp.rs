//! Millisecond-precision timestamp type
//!
//! Timestamps are stored as signed milliseconds since Unix epoch
//! (1970-01-01 00:00:00 UTC). Instants before the epoch are negative.
//!
//! ## Precision
//!
//! Every constructor that accepts a finer unit floors it to the millisecond.
//! Sub-millisecond information is never retained, so two timestamps built
//! from instants inside the same millisecond are equal.
//!
//! ```
//! use docstore_core::Timestamp;
//!
//! let a = Timestamp::from_micros(1_700_000_000_123_456);
//! let b = Timestamp::from_millis(1_700_000_000_123);
//! assert_eq!(a, b);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Millisecond-precision timestamp
///
/// ## Invariants
///
/// - The stored value is always whole milliseconds
/// - Timestamps are comparable and orderable
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp for the current moment
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Create a timestamp from microseconds since epoch, flooring to the millisecond
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros.div_euclid(1_000))
    }

    /// Create a timestamp from nanoseconds since epoch, flooring to the millisecond
    ///
    /// Saturates at the representable bounds.
    #[inline]
    pub const fn from_nanos(nanos: i128) -> Self {
        let millis = nanos.div_euclid(1_000_000);
        if millis > i64::MAX as i128 {
            Timestamp(i64::MAX)
        } else if millis < i64::MIN as i128 {
            Timestamp(i64::MIN)
        } else {
            Timestamp(millis as i64)
        }
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1_000))
    }

    /// Create a timestamp from a chrono `DateTime<Utc>`
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_millis())
    }

    /// Create a timestamp from a `SystemTime`
    ///
    /// Instants before the epoch are supported and yield negative values.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::from_nanos(after.as_nanos() as i128),
            Err(before) => Self::from_nanos(-(before.duration().as_nanos() as i128)),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get milliseconds since Unix epoch
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Get whole seconds since Unix epoch (floors)
    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0.div_euclid(1_000)
    }

    /// Convert to a chrono `DateTime<Utc>`
    ///
    /// Returns `None` when the value is outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// Add a duration, saturating at the representable bounds
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

// ============================================================================
// From Implementations
// ============================================================================

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::from_datetime(dt)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Timestamp::from_system_time(time)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_epoch() {
        assert_eq!(Timestamp::EPOCH.as_millis(), 0);
        assert_eq!(Timestamp::EPOCH.as_secs(), 0);
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
    }

    #[test]
    fn test_from_micros_truncates() {
        let ts = Timestamp::from_micros(1_234_999);
        assert_eq!(ts.as_millis(), 1_234);
    }

    #[test]
    fn test_from_nanos_truncates() {
        let ts = Timestamp::from_nanos(1_700_000_000_123_999_999);
        assert_eq!(ts.as_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_from_nanos_saturates() {
        assert_eq!(Timestamp::from_nanos(i128::MAX).as_millis(), i64::MAX);
        assert_eq!(Timestamp::from_nanos(i128::MIN).as_millis(), i64::MIN);

        let max_nanos = i64::MAX as i128 * 1_000_000;
        assert_eq!(Timestamp::from_nanos(max_nanos).as_millis(), i64::MAX);
        assert_eq!(Timestamp::from_nanos(max_nanos + 1_000_000).as_millis(), i64::MAX);

        let min_nanos = i64::MIN as i128 * 1_000_000;
        assert_eq!(Timestamp::from_nanos(min_nanos).as_millis(), i64::MIN);
        assert_eq!(Timestamp::from_nanos(min_nanos - 1).as_millis(), i64::MIN);
    }

    #[test]
    fn test_negative_sub_millisecond_floors() {
        // 1.5ms before the epoch belongs to millisecond -2
        assert_eq!(Timestamp::from_micros(-1_500).as_millis(), -2);
        assert_eq!(Timestamp::from_micros(-1_000).as_millis(), -1);
    }

    #[test]
    fn test_same_millisecond_instants_are_equal() {
        let a = Timestamp::from_micros(42_001);
        let b = Timestamp::from_micros(42_999);
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_secs() {
        let ts = Timestamp::from_secs(1000);
        assert_eq!(ts.as_millis(), 1_000_000);
        assert_eq!(ts.as_secs(), 1000);
    }

    #[test]
    fn test_datetime_roundtrip() {
        let dt = Utc.timestamp_millis_opt(1_689_000_000_321).unwrap();
        let ts = Timestamp::from(dt);
        assert_eq!(ts.as_millis(), 1_689_000_000_321);
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn test_datetime_with_nanos_truncates() {
        let dt = Utc.timestamp_opt(10, 987_654_321).unwrap();
        assert_eq!(Timestamp::from(dt).as_millis(), 10_987);
    }

    #[test]
    fn test_system_time_before_epoch() {
        let before = UNIX_EPOCH - Duration::from_millis(250);
        assert_eq!(Timestamp::from(before).as_millis(), -250);
    }

    #[test]
    fn test_now_advances() {
        let before = Timestamp::now();
        std::thread::sleep(Duration::from_millis(2));
        let after = Timestamp::now();
        assert!(after > before);
    }

    #[test]
    fn test_saturating_add() {
        let ts = Timestamp::from_millis(1_000);
        assert_eq!(ts.saturating_add(Duration::from_secs(60)).as_millis(), 61_000);
        assert_eq!(
            Timestamp::from_millis(i64::MAX).saturating_add(Duration::from_millis(1)),
            Timestamp::from_millis(i64::MAX)
        );
    }

    #[test]
    fn test_display_is_iso8601() {
        let ts = Timestamp::from_millis(1_000);
        assert_eq!(ts.to_string(), "1970-01-01T00:00:01.000Z");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let ts = Timestamp::from_millis(1_234_567);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "1234567");
        let restored: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, restored);
    }
}
