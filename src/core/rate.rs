//! Emission intervals for the GCRA throttler
//!
//! [`Rate`] turns "N calls per period" into the spacing between two
//! consecutive calls, which is what the GCRA gate actually tracks.

use std::time::Duration;

#[cfg(test)]
mod tests;

/// Time between two token emissions
///
/// # Examples
///
/// ```
/// use keythrottle::Rate;
/// use std::time::Duration;
///
/// // 10 calls per second
/// let rate = Rate::per_second(10);
/// assert_eq!(rate.period(), Duration::from_millis(100));
///
/// // 3 calls every 30 seconds
/// let rate = Rate::from_count_and_period(3, Duration::from_secs(30)).unwrap();
/// assert_eq!(rate.period(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    period: Duration,
}

impl Rate {
    /// Creates a rate with a custom period between emissions
    pub fn new(period: Duration) -> Self {
        Rate { period }
    }

    /// Creates a rate of n calls per second
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn per_second(n: u32) -> Self {
        Rate {
            period: Duration::from_secs(1) / n,
        }
    }

    /// Creates a rate of n calls per minute
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn per_minute(n: u32) -> Self {
        Rate {
            period: Duration::from_secs(60) / n,
        }
    }

    /// Creates a rate of n calls per hour
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn per_hour(n: u32) -> Self {
        Rate {
            period: Duration::from_secs(3600) / n,
        }
    }

    /// Creates a rate from a call count and the period it spans
    ///
    /// Returns `None` when either the count or the period is zero.
    pub fn from_count_and_period(count: u32, period: Duration) -> Option<Self> {
        if count == 0 || period.is_zero() {
            return None;
        }

        Some(Rate {
            period: period / count,
        })
    }

    /// Returns the emission interval of this rate
    pub fn period(&self) -> Duration {
        self.period
    }
}
