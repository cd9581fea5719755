//! # keythrottle
//!
//! Per-input throttling for plain Rust functions.
//!
//! ## Overview
//!
//! Throttling a function usually means one timer for every call. keythrottle
//! instead gives each distinct input its own throttle, created the first time
//! that input is seen and reused for every later call with it:
//! - **Per-key independence**: a burst of calls for one key never delays
//!   another key
//! - **Pluggable keying**: a [`Memoizer`] decides which inputs are the same
//! - **Pluggable timing**: a [`Throttler`] decides when a call goes through
//! - **No hidden state**: each combinator owns a fresh registry of gates
//!
//! ## Quick Start
//!
//! ```
//! use keythrottle::{Debounce, HashMemoizer, Strategies, combine};
//! use std::time::Duration;
//!
//! let debounce = Debounce::new(Duration::from_secs(5))?;
//! let refresh = combine(
//!     |user_id: &u64| format!("refreshed cache for {user_id}"),
//!     Strategies {
//!         memoizer: HashMemoizer::new(),
//!         throttler: debounce,
//!     },
//! );
//!
//! // First call per user goes through
//! assert!(refresh.call(1).is_some());
//! assert!(refresh.call(2).is_some());
//!
//! // Repeats inside the quiet period are dropped
//! assert!(refresh.call(1).is_none());
//! # Ok::<(), keythrottle::ThrottleError>(())
//! ```
//!
//! ## How It Works
//!
//! The combinator builds a *factory* that, given an input, wraps
//! `move || target(&input)` in a fresh gate from the throttler. That factory
//! is handed to the memoizer, so the gate for an input is built once and
//! then looked up. Every call resolves the gate for its input and fires it.
//!
//! Because the gate closes over the input it was built from, a later call
//! whose input maps to the same key is served by the first call's values:
//!
//! ```
//! use keythrottle::{KeyMemoizer, KeyedThrottle, Unthrottled};
//!
//! // Keyed on the first field only
//! let greet = KeyedThrottle::new(
//!     |(id, name): &(u32, &'static str)| format!("{id}:{name}"),
//!     KeyMemoizer::new(|args: &(u32, &'static str)| args.0),
//!     Unthrottled,
//! );
//!
//! assert_eq!(greet.call((1, "ann")), "1:ann");
//! assert_eq!(greet.call((1, "bob")), "1:ann");
//! ```
//!
//! ## Strategies
//!
//! ### Memoizers
//! - [`HashMemoizer`]: keys by the whole input (`Hash + Eq + Clone`)
//! - [`KeyMemoizer`]: keys by a projection of the input
//! - any `Fn(Factory<A, V>) -> impl Fn(A) -> V` closure
//!
//! Neither built-in memoizer evicts. Bring your own for TTL or LRU policies.
//!
//! ### Throttlers
//! - [`Debounce`]: leading-edge debounce; repeats inside `wait` are dropped
//! - [`Gcra`]: smooth fixed-rate throttling with bursts
//! - [`Unthrottled`]: always fires
//! - any `Fn(Operation<R>) -> G` closure where `G` is a [`Gate`]
//!
//! What a suppressed call returns is the gate's choice ([`Gate::Output`]);
//! the built-in throttlers use `Option<R>`.
//!
//! ## Thread Safety
//!
//! The combinator adds no locking of its own. The built-in strategies guard
//! their state with `parking_lot` mutexes, so a combinator built from them
//! can be shared across threads behind an [`Arc`](std::sync::Arc).
//!
//! ## Features
//!
//! - `ahash` (default): Use AHash for the built-in registries

pub mod core;

pub use core::{
    Clock, Debounce, DebounceBuilder, DebounceGate, Factory, Gate, Gcra, GcraBuilder, GcraGate,
    HashMemoizer, HashMemoizerBuilder, KeyMemo, KeyMemoizer, KeyMemoizerBuilder, KeyedThrottle,
    ManualClock, Memoized, Memoizer, MonotonicClock, Operation, Rate, Result, Strategies,
    ThrottleError, Throttler, Unthrottled, UnthrottledGate, combine,
};
