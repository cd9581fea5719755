//! Memoizer strategies
//!
//! A [`Memoizer`] takes a per-input [`Factory`] and returns a [`Memoized`]
//! function: calling it with an input either hands back the value stored for
//! an equal input or runs the factory once and stores the result. What counts
//! as "equal" is entirely up to the memoizer.
//!
//! Each call to [`Memoizer::memoize`] yields a fresh registry, so one
//! memoizer value can back any number of independent combinators.

mod keyed;


pub use keyed::{HashMemoizer, HashMemoizerBuilder, KeyMemo, KeyMemoizer, KeyMemoizerBuilder};

/// Per-input factory handed to a memoizer
///
/// Takes the input by value: whatever the factory builds owns the
/// first-seen arguments for its key.
pub type Factory<A, V> = Box<dyn Fn(A) -> V + Send + Sync + 'static>;

/// A memoized function from inputs to stored values
///
/// Any `Fn(A) -> V` closure is a (non-caching) memoized function.
pub trait Memoized<A, V> {
    /// Resolve the value for `args`, building it on first sight
    fn resolve(&self, args: A) -> V;
}

impl<A, V, F> Memoized<A, V> for F
where
    F: Fn(A) -> V,
{
    fn resolve(&self, args: A) -> V {
        self(args)
    }
}

/// Wraps a factory so its results are stored per distinct input
///
/// Any `Fn(Factory<A, V>) -> M` closure returning a memoized function is a
/// memoizer.
///
/// # Example
///
/// ```
/// use keythrottle::{Factory, HashMemoizer, Memoized, Memoizer};
/// use std::sync::Arc;
///
/// let factory: Factory<u32, Arc<String>> = Box::new(|n| Arc::new(format!("#{n}")));
/// let memoized = HashMemoizer::new().memoize(factory);
///
/// let first = memoized.resolve(1);
/// let again = memoized.resolve(1);
/// assert!(Arc::ptr_eq(&first, &again));
/// assert_eq!(*memoized.resolve(2), "#2");
/// ```
pub trait Memoizer<A, V> {
    /// Memoized function produced from a factory
    type Memoized: Memoized<A, V>;

    /// Build a memoized function with its own empty registry
    fn memoize(&self, factory: Factory<A, V>) -> Self::Memoized;
}

impl<A, V, F, M> Memoizer<A, V> for F
where
    F: Fn(Factory<A, V>) -> M,
    M: Memoized<A, V>,
{
    type Memoized = M;

    fn memoize(&self, factory: Factory<A, V>) -> M {
        self(factory)
    }
}
