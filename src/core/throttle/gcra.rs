//! GCRA (Generic Cell Rate Algorithm) throttler
//!
//! Each gate tracks a single theoretical arrival time (TAT). A call is let
//! through when it does not arrive earlier than `TAT - tolerance`, where the
//! tolerance is `emission_interval * (max_burst - 1)`. This gives smooth
//! spacing with room for a burst of `max_burst` calls.

use super::{Gate, Operation, Throttler};
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::rate::Rate;
use crate::core::{Result, ThrottleError};
use parking_lot::Mutex;
use std::time::Duration;

const DEFAULT_MAX_BURST: u32 = 1;
const DEFAULT_COUNT_PER_PERIOD: u32 = 1;
const DEFAULT_PERIOD_SECS: u64 = 1;

/// Fixed-rate throttler with burst support
///
/// Gates return `Some(result)` when the call conforms to the rate and `None`
/// when it arrived too early. Suppressed calls do not consume capacity.
///
/// # Example
///
/// ```
/// use keythrottle::{Gate, Gcra, ManualClock, Operation, Throttler};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// // Burst of 2, then one call per second
/// let gcra = Gcra::builder()
///     .max_burst(2)
///     .count_per_period(1)
///     .period(Duration::from_secs(1))
///     .clock(clock.clone())
///     .build()?;
///
/// let op: Operation<u8> = Box::new(|| 1);
/// let gate = gcra.throttle(op);
/// assert_eq!(gate.fire(), Some(1));
/// assert_eq!(gate.fire(), Some(1));
/// assert_eq!(gate.fire(), None);
///
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(gate.fire(), Some(1));
/// # Ok::<(), keythrottle::ThrottleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Gcra<C = MonotonicClock> {
    emission_interval: Duration,
    tolerance: Duration,
    clock: C,
}

/// Builder for configuring a [`Gcra`]
#[derive(Debug, Clone)]
pub struct GcraBuilder<C = MonotonicClock> {
    max_burst: u32,
    count_per_period: u32,
    period: Duration,
    // Takes precedence over count_per_period / period when set
    rate: Option<Rate>,
    clock: C,
}

/// Gate built by [`Gcra`]
pub struct GcraGate<R, C = MonotonicClock> {
    op: Operation<R>,
    emission_interval_ns: i64,
    tolerance_ns: i64,
    clock: C,
    tat: Mutex<Option<i64>>,
}

impl Gcra {
    /// Create a new builder for configuring a Gcra
    pub fn builder() -> GcraBuilder {
        GcraBuilder::default()
    }
}

impl<C> Gcra<C> {
    /// Spacing between two calls once the burst is spent
    pub fn emission_interval(&self) -> Duration {
        self.emission_interval
    }
}

impl<R, C> Throttler<R> for Gcra<C>
where
    C: Clock + Clone,
{
    type Gate = GcraGate<R, C>;

    fn throttle(&self, op: Operation<R>) -> GcraGate<R, C> {
        GcraGate {
            op,
            emission_interval_ns: duration_to_ns(self.emission_interval),
            tolerance_ns: duration_to_ns(self.tolerance),
            clock: self.clock.clone(),
            tat: Mutex::new(None),
        }
    }
}

impl<R, C: Clock> GcraGate<R, C> {
    /// Decide whether a call at `now_ns` conforms and record it if so
    fn admit(&self, now_ns: i64) -> bool {
        let mut tat_slot = self.tat.lock();

        // A fresh gate starts one interval in the past, accounting for the
        // call being admitted. A stale TAT is clamped to the same point so a
        // long idle stretch never grants more than a full burst.
        let floor = now_ns.saturating_sub(self.emission_interval_ns);
        let tat = match *tat_slot {
            Some(stored) => stored.max(floor),
            None => floor,
        };

        let new_tat = tat.saturating_add(self.emission_interval_ns);
        let allow_at = new_tat.saturating_sub(self.tolerance_ns);
        let allowed = now_ns >= allow_at;

        if allowed {
            *tat_slot = Some(new_tat);
        }
        allowed
    }
}

impl<R, C: Clock> Gate for GcraGate<R, C> {
    type Output = Option<R>;

    fn fire(&self) -> Option<R> {
        let now_ns = duration_to_ns(self.clock.now());

        if self.admit(now_ns) {
            Some((self.op)())
        } else {
            tracing::trace!("gcra suppressed call");
            None
        }
    }
}

fn duration_to_ns(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

impl Default for GcraBuilder {
    fn default() -> Self {
        Self {
            max_burst: DEFAULT_MAX_BURST,
            count_per_period: DEFAULT_COUNT_PER_PERIOD,
            period: Duration::from_secs(DEFAULT_PERIOD_SECS),
            rate: None,
            clock: MonotonicClock::new(),
        }
    }
}

impl<C> GcraBuilder<C> {
    /// Maximum number of calls let through back to back
    pub fn max_burst(mut self, max_burst: u32) -> Self {
        self.max_burst = max_burst;
        self
    }

    /// Number of calls allowed per period once the burst is spent
    pub fn count_per_period(mut self, count: u32) -> Self {
        self.count_per_period = count;
        self
    }

    /// Length of the period `count_per_period` applies to
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the emission interval directly
    ///
    /// Overrides `count_per_period` and `period`.
    ///
    /// # Example
    ///
    /// ```
    /// use keythrottle::{Gcra, Rate};
    /// use std::time::Duration;
    ///
    /// let gcra = Gcra::builder().max_burst(5).rate(Rate::per_minute(30)).build()?;
    /// assert_eq!(gcra.emission_interval(), Duration::from_secs(2));
    /// # Ok::<(), keythrottle::ThrottleError>(())
    /// ```
    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Use a different time source
    pub fn clock<C2: Clock + Clone>(self, clock: C2) -> GcraBuilder<C2> {
        GcraBuilder {
            max_burst: self.max_burst,
            count_per_period: self.count_per_period,
            period: self.period,
            rate: self.rate,
            clock,
        }
    }

    /// Build the Gcra with the configured settings
    ///
    /// # Errors
    ///
    /// [`ThrottleError::InvalidRateLimit`] if the burst, count, period or
    /// explicit rate interval is zero.
    pub fn build(self) -> Result<Gcra<C>> {
        if self.max_burst == 0 {
            return Err(ThrottleError::InvalidRateLimit);
        }

        let rate = match self.rate {
            Some(rate) if rate.period().is_zero() => return Err(ThrottleError::InvalidRateLimit),
            Some(rate) => rate,
            None => Rate::from_count_and_period(self.count_per_period, self.period)
                .ok_or(ThrottleError::InvalidRateLimit)?,
        };
        let emission_interval = rate.period();
        let tolerance = emission_interval.saturating_mul(self.max_burst - 1);

        Ok(Gcra {
            emission_interval,
            tolerance,
            clock: self.clock,
        })
    }
}
