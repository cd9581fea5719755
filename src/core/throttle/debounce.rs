use super::{Gate, Operation, Throttler};
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::{Result, ThrottleError};
use parking_lot::Mutex;
use std::time::Duration;

const DEFAULT_WAIT_MILLIS: u64 = 1000;

/// Leading-edge debounce
///
/// The first call fires immediately. Every call that arrives less than
/// `wait` after the previous call (fired or not) is suppressed and pushes the
/// quiet period forward, so a steady stream of calls fires only once. There
/// is no trailing invocation: a suppressed call is dropped, not deferred.
///
/// Gates return `Some(result)` when the operation ran and `None` when the
/// call was suppressed.
///
/// # Example
///
/// ```
/// use keythrottle::{Debounce, Gate, ManualClock, Operation, Throttler};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let debounce = Debounce::builder()
///     .wait(Duration::from_millis(100))
///     .clock(clock.clone())
///     .build()?;
///
/// let op: Operation<&str> = Box::new(|| "ran");
/// let gate = debounce.throttle(op);
/// assert_eq!(gate.fire(), Some("ran"));
/// assert_eq!(gate.fire(), None);
///
/// clock.advance(Duration::from_millis(100));
/// assert_eq!(gate.fire(), Some("ran"));
/// # Ok::<(), keythrottle::ThrottleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Debounce<C = MonotonicClock> {
    wait: Duration,
    clock: C,
}

/// Builder for configuring a [`Debounce`]
#[derive(Debug, Clone)]
pub struct DebounceBuilder<C = MonotonicClock> {
    wait: Duration,
    clock: C,
}

/// Gate built by [`Debounce`]
pub struct DebounceGate<R, C = MonotonicClock> {
    op: Operation<R>,
    wait: Duration,
    clock: C,
    // Time of the most recent call, fired or suppressed
    last_call: Mutex<Option<Duration>>,
}

impl Debounce {
    /// Create a debounce with the given quiet period on the monotonic clock
    ///
    /// # Errors
    ///
    /// [`ThrottleError::InvalidWindow`] if `wait` is zero.
    pub fn new(wait: Duration) -> Result<Self> {
        Self::builder().wait(wait).build()
    }

    /// Create a new builder for configuring a Debounce
    pub fn builder() -> DebounceBuilder {
        DebounceBuilder::default()
    }
}

impl<C> Debounce<C> {
    /// The configured quiet period
    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<R, C> Throttler<R> for Debounce<C>
where
    C: Clock + Clone,
{
    type Gate = DebounceGate<R, C>;

    fn throttle(&self, op: Operation<R>) -> DebounceGate<R, C> {
        DebounceGate {
            op,
            wait: self.wait,
            clock: self.clock.clone(),
            last_call: Mutex::new(None),
        }
    }
}

impl<R, C: Clock> Gate for DebounceGate<R, C> {
    type Output = Option<R>;

    fn fire(&self) -> Option<R> {
        let now = self.clock.now();

        // The lock is released before the operation runs so a failing or
        // reentrant target never sees it held.
        let quiet = {
            let mut last_call = self.last_call.lock();
            match *last_call {
                // A caller that read the clock earlier but locked later must
                // not move the most recent call backwards.
                Some(previous) => {
                    *last_call = Some(previous.max(now));
                    now.saturating_sub(previous) >= self.wait
                }
                None => {
                    *last_call = Some(now);
                    true
                }
            }
        };

        if quiet {
            Some((self.op)())
        } else {
            tracing::trace!(wait_ms = self.wait.as_millis() as u64, "debounce suppressed call");
            None
        }
    }
}

impl Default for DebounceBuilder {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(DEFAULT_WAIT_MILLIS),
            clock: MonotonicClock::new(),
        }
    }
}

impl<C> DebounceBuilder<C> {
    /// Set the quiet period
    ///
    /// Calls closer together than this are collapsed into the first one.
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Use a different time source
    pub fn clock<C2: Clock + Clone>(self, clock: C2) -> DebounceBuilder<C2> {
        DebounceBuilder {
            wait: self.wait,
            clock,
        }
    }

    /// Build the Debounce with the configured settings
    ///
    /// # Errors
    ///
    /// [`ThrottleError::InvalidWindow`] if the wait is zero.
    pub fn build(self) -> Result<Debounce<C>> {
        if self.wait.is_zero() {
            return Err(ThrottleError::InvalidWindow);
        }

        Ok(Debounce {
            wait: self.wait,
            clock: self.clock,
        })
    }
}
