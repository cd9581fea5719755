//! Core components of the keythrottle library
//!
//! This module contains the building blocks:
//! - [`combinator`]: the per-input throttle combinator
//! - [`memo`]: memoizer strategies that own the per-input registry
//! - [`throttle`]: throttler strategies that gate zero-argument operations
//! - [`rate`]: emission intervals for the GCRA throttler
//! - [`clock`]: time sources for the reference throttlers

pub mod clock;
pub mod combinator;
pub mod memo;
pub mod rate;
pub mod throttle;
#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use combinator::{KeyedThrottle, Strategies, combine};
pub use memo::{
    Factory, HashMemoizer, HashMemoizerBuilder, KeyMemo, KeyMemoizer, KeyMemoizerBuilder,
    Memoized, Memoizer,
};
pub use rate::Rate;
pub use throttle::{
    Debounce, DebounceBuilder, DebounceGate, Gate, Gcra, GcraBuilder, GcraGate, Operation,
    Throttler, Unthrottled, UnthrottledGate,
};

use thiserror::Error;

/// Errors raised while configuring the reference strategies
///
/// The combinator itself never fails. Target failures are returned through
/// the gate's output untouched.
///
/// # Example
///
/// ```
/// use keythrottle::{Debounce, ThrottleError};
/// use std::time::Duration;
///
/// match Debounce::new(Duration::ZERO) {
///     Err(ThrottleError::InvalidWindow) => println!("wait must be positive"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// Debounce wait of zero
    #[error("invalid debounce window: wait must be greater than zero")]
    InvalidWindow,

    /// GCRA parameters with a zero burst, count or period
    #[error("invalid rate limit parameters")]
    InvalidRateLimit,
}

pub type Result<T> = std::result::Result<T, ThrottleError>;
