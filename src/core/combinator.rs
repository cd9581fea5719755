//! Per-input throttle combinator
//!
//! [`combine`] turns a target function into one that is throttled separately
//! for every distinct input. It does so by memoizing a *factory* of throttle
//! gates: the memoizer decides which inputs are "the same", the throttler
//! decides when a gate lets a call through, and the combinator only wires the
//! two together.
//!
//! # First-capture semantics
//!
//! The gate for a key closes over the arguments of the *first* call that
//! produced that key. Later calls mapping to the same key never reach the
//! target with their own values: their arguments are dropped and the stored
//! gate is fired as-is. With a memoizer that keys on part of the input, the
//! target always observes the first-seen values of the remaining fields.
//!
//! # Failures
//!
//! The combinator neither catches nor wraps anything. A target returning
//! `Err` (or panicking) surfaces from [`KeyedThrottle::call`] only when the
//! gate runs the operation synchronously; a gate that defers the operation
//! owns whatever failure happens later.

use super::memo::{Factory, Memoized, Memoizer};
use super::throttle::{Gate, Operation, Throttler};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The memoizer and throttler a combinator is built from
///
/// Both are strategies: building two combinators from the same (cloned)
/// strategies yields two combinators with independent per-input state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strategies<M, T> {
    /// Keying policy; owns the per-input registry of gates
    pub memoizer: M,
    /// Timing policy; builds one gate per distinct input
    pub throttler: T,
}

/// A target function throttled independently per distinct input
///
/// Built by [`combine`] or [`KeyedThrottle::new`]. `A` is the target's input,
/// `G` the gate type the throttler produces and `P` the memoized gate lookup.
///
/// # Example
///
/// ```
/// use keythrottle::{Debounce, KeyMemoizer, KeyedThrottle, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let debounce = Debounce::builder()
///     .wait(Duration::from_secs(30))
///     .clock(clock.clone())
///     .build()?;
///
/// // One alert per host every 30 quiet seconds, whatever the message says
/// let alert = KeyedThrottle::new(
///     |event: &(String, String)| format!("{}: {}", event.0, event.1),
///     KeyMemoizer::new(|event: &(String, String)| event.0.clone()),
///     debounce,
/// );
///
/// let fired = alert.call(("db-1".to_string(), "disk full".to_string()));
/// assert_eq!(fired.as_deref(), Some("db-1: disk full"));
/// assert_eq!(alert.call(("db-1".to_string(), "disk still full".to_string())), None);
///
/// clock.advance(Duration::from_secs(30));
/// // The gate for db-1 still carries the first event it saw
/// let fired = alert.call(("db-1".to_string(), "disk fixed".to_string()));
/// assert_eq!(fired.as_deref(), Some("db-1: disk full"));
/// # Ok::<(), keythrottle::ThrottleError>(())
/// ```
pub struct KeyedThrottle<A, G, P> {
    memoized: P,
    _marker: PhantomData<fn(A) -> G>,
}

/// Combine a target with a memoizer and a throttler
///
/// Returns a function with the same input as `target` whose calls are
/// throttled per distinct input, as decided by `strategies.memoizer`.
///
/// # Thread-safe captures only
///
/// The target, its input type and the throttler must be
/// `Send + Sync + 'static`: gates may be shared across threads or hand their
/// operation to a timer thread. A target that captures `Rc` or `RefCell`
/// state cannot be wrapped; use `Arc` with an atomic or a mutex instead.
///
/// ```compile_fail
/// use keythrottle::{HashMemoizer, Strategies, Unthrottled, combine};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let calls = Rc::new(RefCell::new(0));
/// let counted = Rc::clone(&calls);
/// let limited = combine(
///     move |_n: &u32| *counted.borrow_mut() += 1,
///     Strategies { memoizer: HashMemoizer::new(), throttler: Unthrottled },
/// );
/// ```
///
/// # Example
///
/// ```
/// use keythrottle::{Debounce, HashMemoizer, Strategies, combine};
/// use std::time::Duration;
///
/// let debounce = Debounce::new(Duration::from_secs(60))?;
/// let notify = combine(
///     |user: &String| format!("notified {user}"),
///     Strategies {
///         memoizer: HashMemoizer::new(),
///         throttler: debounce,
///     },
/// );
///
/// assert_eq!(notify.call("alice".to_string()).as_deref(), Some("notified alice"));
/// // A repeat inside the window is suppressed
/// assert_eq!(notify.call("alice".to_string()), None);
/// // Other users have their own debounce
/// assert_eq!(notify.call("bob".to_string()).as_deref(), Some("notified bob"));
/// # Ok::<(), keythrottle::ThrottleError>(())
/// ```
pub fn combine<A, R, F, M, T>(
    target: F,
    strategies: Strategies<M, T>,
) -> KeyedThrottle<A, T::Gate, M::Memoized>
where
    A: Send + Sync + 'static,
    R: 'static,
    F: Fn(&A) -> R + Send + Sync + 'static,
    T: Throttler<R> + Send + Sync + 'static,
    M: Memoizer<A, Arc<T::Gate>>,
{
    KeyedThrottle::new(target, strategies.memoizer, strategies.throttler)
}

impl<A, G, P> KeyedThrottle<A, G, P>
where
    G: Gate,
    P: Memoized<A, Arc<G>>,
{
    /// Build a combinator from a target, a memoizer and a throttler
    ///
    /// The memoizer is asked for a fresh registry, so the returned value
    /// shares no per-input state with any other combinator.
    /// The same `Send + Sync + 'static` bounds as [`combine`] apply.
    pub fn new<R, F, M, T>(target: F, memoizer: M, throttler: T) -> Self
    where
        A: Send + Sync + 'static,
        R: 'static,
        F: Fn(&A) -> R + Send + Sync + 'static,
        T: Throttler<R, Gate = G> + Send + Sync + 'static,
        M: Memoizer<A, Arc<G>, Memoized = P>,
    {
        let target = Arc::new(target);

        // Only runs for inputs the memoizer has not seen; `args` moves into
        // the operation and stays there for the life of the gate.
        let factory: Factory<A, Arc<G>> = Box::new(move |args: A| {
            tracing::trace!("building throttle gate for new input");
            let target = Arc::clone(&target);
            let op: Operation<R> = Box::new(move || target(&args));
            Arc::new(throttler.throttle(op))
        });

        KeyedThrottle {
            memoized: memoizer.memoize(factory),
            _marker: PhantomData,
        }
    }

    /// Fire the gate for `args`, creating it on first sight
    ///
    /// Returns whatever the gate returns: the target's result when the call
    /// goes through, the throttler's own marker when it is suppressed.
    pub fn call(&self, args: A) -> G::Output {
        let gate = self.memoized.resolve(args);
        G::fire(&gate)
    }

    /// The memoized gate lookup backing this combinator
    pub fn memoized(&self) -> &P {
        &self.memoized
    }
}

impl<A, G, P> fmt::Debug for KeyedThrottle<A, G, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedThrottle").finish_non_exhaustive()
    }
}
