//! Millisecond timeouts with an explicit "never" sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A relative timeout in clock ticks (milliseconds), or `Infinite`.
///
/// `Infinite` is the disabled sentinel: a ledger entry armed with it never
/// expires, and an alarm given it is cancelled. Every finite value orders
/// before `Infinite`, so the minimum of several offsets is simply `min()`.
///
/// Integer conversion follows the usual convention where any negative value
/// means "infinite" and `Infinite` converts back to `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Timeout {
    /// Fires after the given number of milliseconds.
    Millis(u64),
    /// Never fires.
    Infinite,
}

impl Timeout {
    /// A timeout that is already due.
    pub const ZERO: Self = Self::Millis(0);

    /// Build a timeout from a signed millisecond count; negatives are infinite.
    #[must_use]
    pub fn from_millis(ms: i64) -> Self {
        u64::try_from(ms).map_or(Self::Infinite, Self::Millis)
    }

    /// Returns `true` for the disabled sentinel.
    #[must_use]
    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// The finite millisecond count, if any.
    #[must_use]
    pub fn as_millis(self) -> Option<u64> {
        match self {
            Self::Millis(ms) => Some(ms),
            Self::Infinite => None,
        }
    }

    /// The timeout as a `Duration`, or `None` when infinite.
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        self.as_millis().map(Duration::from_millis)
    }

    /// Absolute deadline for this timeout measured from `now`.
    ///
    /// Returns `None` when infinite. Saturates instead of overflowing.
    #[must_use]
    pub fn deadline_from(self, now: i64) -> Option<i64> {
        self.as_millis()
            .map(|ms| now.saturating_add(i64::try_from(ms).unwrap_or(i64::MAX)))
    }
}

impl From<i64> for Timeout {
    fn from(ms: i64) -> Self {
        Self::from_millis(ms)
    }
}

impl From<Timeout> for i64 {
    fn from(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Millis(ms) => i64::try_from(ms).unwrap_or(i64::MAX),
            Timeout::Infinite => -1,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::Millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}ms"),
            Self::Infinite => f.write_str("infinite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_is_infinite() {
        assert_eq!(Timeout::from_millis(-1), Timeout::Infinite);
        assert_eq!(Timeout::from_millis(-500), Timeout::Infinite);
        assert_eq!(Timeout::from_millis(0), Timeout::ZERO);
        assert_eq!(i64::from(Timeout::Infinite), -1);
    }

    #[test]
    fn test_finite_orders_before_infinite() {
        assert!(Timeout::Millis(u64::MAX) < Timeout::Infinite);
        assert_eq!(
            Timeout::Millis(10).min(Timeout::Millis(5)),
            Timeout::Millis(5)
        );
        assert_eq!(Timeout::Infinite.min(Timeout::Millis(7)), Timeout::Millis(7));
    }

    #[test]
    fn test_deadline_saturates() {
        assert_eq!(Timeout::Millis(5).deadline_from(-2), Some(3));
        assert_eq!(Timeout::Infinite.deadline_from(0), None);
        assert_eq!(Timeout::Millis(u64::MAX).deadline_from(1), Some(i64::MAX));
    }
}
