//! Expiry instants and relative durations

use crate::crypto::now_epoch_ms;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = MS_PER_SECOND * 60;
const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;
const MS_PER_DAY: u64 = MS_PER_HOUR * 24;

/// Absolute instant, milliseconds since the Unix epoch.
///
/// Stored as `i64`, the width it has on the wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Expiry(i64);

impl Expiry {
    pub const fn from_epoch_ms(epoch_ms: i64) -> Self {
        Self(epoch_ms)
    }

    pub const fn epoch_ms(&self) -> i64 {
        self.0
    }

    /// `now + duration`, rejecting empty durations
    pub fn after(duration: &ExpiryDuration) -> Result<Self> {
        Self::after_from(now_epoch_ms(), duration)
    }

    /// `now_ms + duration` against an explicit clock reading
    pub fn after_from(now_ms: i64, duration: &ExpiryDuration) -> Result<Self> {
        let delta = i64::try_from(duration.to_millis()?).map_err(|_| Error::InvalidExpiry)?;
        now_ms
            .checked_add(delta)
            .map(Self)
            .ok_or(Error::InvalidExpiry)
    }

    /// Strictly after the expiry. An expiry of zero never lapses.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.0 > 0 && now_ms > self.0
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_epoch_ms())
    }
}

impl From<i64> for Expiry {
    fn from(epoch_ms: i64) -> Self {
        Self(epoch_ms)
    }
}

impl fmt::Debug for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expiry({})", self.0)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::<chrono::Utc>::from_timestamp_millis(self.0) {
            Some(at) => write!(f, "{}", at.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Relative lifetime. Absent fields count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
}

impl ExpiryDuration {
    pub fn days(days: u64) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    pub fn hours(hours: u64) -> Self {
        Self {
            hours: Some(hours),
            ..Self::default()
        }
    }

    pub fn minutes(minutes: u64) -> Self {
        Self {
            minutes: Some(minutes),
            ..Self::default()
        }
    }

    pub fn seconds(seconds: u64) -> Self {
        Self {
            seconds: Some(seconds),
            ..Self::default()
        }
    }

    /// Total length in milliseconds. Zero or overflow is `InvalidExpiry`.
    pub fn to_millis(&self) -> Result<u64> {
        let parts = [
            (self.days, MS_PER_DAY),
            (self.hours, MS_PER_HOUR),
            (self.minutes, MS_PER_MINUTE),
            (self.seconds, MS_PER_SECOND),
        ];

        let mut delta: u64 = 0;
        for (value, unit) in parts {
            let ms = value
                .unwrap_or(0)
                .checked_mul(unit)
                .ok_or(Error::InvalidExpiry)?;
            delta = delta.checked_add(ms).ok_or(Error::InvalidExpiry)?;
        }

        if delta == 0 {
            return Err(Error::InvalidExpiry);
        }
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_sums_fields() {
        let duration = ExpiryDuration {
            days: Some(1),
            hours: Some(2),
            minutes: Some(3),
            seconds: Some(4),
        };

        assert_eq!(
            duration.to_millis().unwrap(),
            86_400_000 + 2 * 3_600_000 + 3 * 60_000 + 4_000
        );
    }

    #[test]
    fn test_empty_duration_rejected() {
        assert!(matches!(
            ExpiryDuration::default().to_millis(),
            Err(Error::InvalidExpiry)
        ));

        let zeros = ExpiryDuration {
            days: Some(0),
            hours: Some(0),
            minutes: None,
            seconds: Some(0),
        };
        assert!(matches!(zeros.to_millis(), Err(Error::InvalidExpiry)));
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(matches!(
            ExpiryDuration::days(u64::MAX).to_millis(),
            Err(Error::InvalidExpiry)
        ));
        assert!(matches!(
            Expiry::after_from(i64::MAX - 10, &ExpiryDuration::seconds(1)),
            Err(Error::InvalidExpiry)
        ));
    }

    #[test]
    fn test_after_from_is_exact() {
        let now = 1_700_000_000_000;
        let expiry = Expiry::after_from(now, &ExpiryDuration::days(1)).unwrap();

        assert_eq!(expiry.epoch_ms(), now + 86_400_000);
    }

    #[test]
    fn test_liveness() {
        let expiry = Expiry::from_epoch_ms(1_000);

        assert!(!expiry.is_expired_at(999));
        assert!(!expiry.is_expired_at(1_000));
        assert!(expiry.is_expired_at(1_001));

        // zero never lapses
        assert!(!Expiry::from_epoch_ms(0).is_expired_at(i64::MAX));
    }

    #[test]
    fn test_duration_serde_skips_absent_fields() {
        let json = serde_json::to_string(&ExpiryDuration::hours(6)).unwrap();
        assert_eq!(json, r#"{"hours":6}"#);

        let back: ExpiryDuration = serde_json::from_str("{}").unwrap();
        assert_eq!(back, ExpiryDuration::default());
    }
}
