//! Retry interval generators.
//!
//! This module groups the generator contract and its implementations.
//!
//! ## Contents
//! - [`Backoff`] the contract: `reset` / `next_interval` / `fork`
//! - [`LinearBackoff`] arithmetic sequence capped at a maximum (also zero and constant)
//! - [`ExponentialBackoff`] geometric sequence with optional jitter, capped at a maximum
//!
//! ## Quick wiring
//! ```text
//! caller retry loop
//!      ├─► op() → Err  ──► delay = backoff.next_interval() ──► caller sleeps(delay)
//!      ├─► op() → Err  ──► delay = backoff.next_interval() ──► caller sleeps(delay)
//!      └─► op() → Ok   ──► backoff.reset()  (next failure starts from the minimum again)
//! ```
//!
//! ## Defaults
//! - `LinearBackoff::zero()` → always `0`.
//! - `ExponentialBackoff::new(min, max)` → multiplier=2.0, random_factor=0.0 (deterministic).
//! - `ExponentialConfig::default()` → min=10ms, max=10min, multiplier=2.0, random_factor=0.0.

mod exponential;
mod linear;

pub use exponential::{ExponentialBackoff, ExponentialBuilder, ExponentialConfig};
pub use linear::LinearBackoff;

use std::iter::FusedIterator;
use std::time::Duration;

/// A stateful retry interval generator.
///
/// Each call to [`Backoff::next_interval`] returns the delay for the current position
/// in the sequence and advances by one. [`Backoff::reset`] forgets every previous
/// attempt. Both are total: they never fail and never panic.
///
/// Generators are single-owner: advancing takes `&mut self`, so sharing one between
/// concurrent retry sequences needs external synchronization. Prefer one generator per
/// sequence, derived from a configured template with [`Backoff::fork`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use backoff_gen::{Backoff, LinearBackoff};
///
/// let mut backoff = LinearBackoff::new(
///     Duration::from_millis(1),
///     Duration::from_millis(1),
///     Duration::from_millis(4),
/// );
/// assert_eq!(backoff.next_interval(), Duration::from_millis(1));
/// assert_eq!(backoff.next_interval(), Duration::from_millis(2));
///
/// backoff.reset();
/// assert_eq!(backoff.next_interval(), Duration::from_millis(1));
/// ```
pub trait Backoff: Send {
    /// Marks the next call to [`Backoff::next_interval`] as the first retry of a sequence.
    fn reset(&mut self);

    /// Returns the next interval and advances the sequence.
    fn next_interval(&mut self) -> Duration;

    /// Returns an independent generator with the same configuration at the initial position.
    fn fork(&self) -> Box<dyn Backoff>;

    /// Returns an endless iterator over the upcoming intervals.
    ///
    /// ```
    /// use std::time::Duration;
    /// use backoff_gen::{Backoff, ExponentialBackoff};
    ///
    /// let mut backoff = ExponentialBackoff::new(Duration::from_millis(1), Duration::from_millis(4));
    /// let ms: Vec<u128> = backoff.intervals().take(5).map(|d| d.as_millis()).collect();
    /// assert_eq!(ms, [1, 2, 4, 4, 4]);
    /// ```
    fn intervals(&mut self) -> Intervals<'_, Self>
    where
        Self: Sized,
    {
        Intervals { backoff: self }
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next_interval(&mut self) -> Duration {
        (**self).next_interval()
    }

    fn fork(&self) -> Box<dyn Backoff> {
        (**self).fork()
    }
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn next_interval(&mut self) -> Duration {
        (**self).next_interval()
    }

    fn fork(&self) -> Box<dyn Backoff> {
        (**self).fork()
    }
}

/// Endless iterator returned by [`Backoff::intervals`].
#[derive(Debug)]
pub struct Intervals<'a, B: ?Sized> {
    backoff: &'a mut B,
}

impl<B: Backoff + ?Sized> Iterator for Intervals<'_, B> {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.backoff.next_interval())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<B: Backoff + ?Sized> FusedIterator for Intervals<'_, B> {}
