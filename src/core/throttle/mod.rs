//! Throttler strategies
//!
//! A [`Throttler`] wraps a zero-argument [`Operation`] into a [`Gate`], a
//! zero-argument operation whose invocation is time-gated. Each gate owns its
//! timing state, so two gates built by the same throttler never interfere.
//!
//! What a gate returns for a suppressed call is its own business: the
//! reference gates here return `Option<R>` with `None` for suppression, while
//! [`Unthrottled`] always returns the plain result. Callers plugging in their
//! own throttler pick whatever absence representation suits them through
//! [`Gate::Output`].

mod debounce;
mod gcra;
mod unthrottled;


pub use debounce::{Debounce, DebounceBuilder, DebounceGate};
pub use gcra::{Gcra, GcraBuilder, GcraGate};
pub use unthrottled::{Unthrottled, UnthrottledGate};

/// A zero-argument operation handed to a throttler
///
/// Thread-safe so a throttler may run it from another thread or a timer.
pub type Operation<R> = Box<dyn Fn() -> R + Send + Sync + 'static>;

/// A time-gated zero-argument operation
///
/// Any `Fn() -> O` closure is a gate that always fires.
pub trait Gate {
    /// Result of firing the gate, including whatever marks a suppressed call
    type Output;

    /// Trigger the gate; the wrapped operation may run now, later or never
    fn fire(&self) -> Self::Output;
}

impl<F, O> Gate for F
where
    F: Fn() -> O,
{
    type Output = O;

    fn fire(&self) -> O {
        self()
    }
}

/// Builds an independent [`Gate`] around each operation it is given
///
/// Any `Fn(Operation<R>) -> G` closure returning a gate is a throttler.
///
/// # Example
///
/// ```
/// use keythrottle::{Gate, Operation, Throttler};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// // Fires exactly once, then reports suppression with an error value.
/// let once = |op: Operation<u32>| {
///     let fired = AtomicBool::new(false);
///     move || {
///         if fired.swap(true, Ordering::SeqCst) {
///             Err("already fired")
///         } else {
///             Ok(op())
///         }
///     }
/// };
///
/// let op: Operation<u32> = Box::new(|| 7);
/// let gate = once.throttle(op);
/// assert_eq!(gate.fire(), Ok(7));
/// assert_eq!(gate.fire(), Err("already fired"));
/// ```
pub trait Throttler<R> {
    /// Gate produced for each operation
    type Gate: Gate;

    /// Wrap `op` in a fresh gate with its own timing state
    fn throttle(&self, op: Operation<R>) -> Self::Gate;
}

impl<R, F, G> Throttler<R> for F
where
    F: Fn(Operation<R>) -> G,
    G: Gate,
{
    type Gate = G;

    fn throttle(&self, op: Operation<R>) -> G {
        self(op)
    }
}
