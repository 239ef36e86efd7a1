//! # Linear backoff.
//!
//! [`LinearBackoff`] returns an arithmetic sequence starting at a minimum and growing
//! by a fixed step until it saturates at a maximum:
//!
//! ```text
//! min, min + add, min + 2·add, …, max, max, max, …
//! ```
//!
//! Zero and constant policies are degenerate parameterizations:
//! - [`LinearBackoff::zero`]        → `new(0, 0, 0)`
//! - [`LinearBackoff::constant`]    → `new(d, 0, d)`
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use backoff_gen::{Backoff, LinearBackoff};
//!
//! let ms = Duration::from_millis;
//! let mut backoff = LinearBackoff::new(ms(1), ms(1), ms(4));
//!
//! let seq: Vec<Duration> = backoff.intervals().take(6).collect();
//! assert_eq!(seq, [ms(1), ms(2), ms(3), ms(4), ms(4), ms(4)]);
//! ```

use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::generators::Backoff;

/// Interval generator which grows by a constant amount on each unsuccessful retry.
///
/// No validation is performed by [`LinearBackoff::new`]: with `max < min` the generator
/// returns `min` once and `max` afterwards. Use [`LinearBackoff::try_new`] to reject it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearBackoff {
    min_interval: Duration,
    add_interval: Duration,
    max_interval: Duration,
    current: Duration,
}

impl LinearBackoff {
    /// Creates a generator starting at `min_interval`, growing by `add_interval`,
    /// capped at `max_interval`.
    pub fn new(min_interval: Duration, add_interval: Duration, max_interval: Duration) -> Self {
        if max_interval < min_interval {
            tracing::debug!(
                ?min_interval,
                ?max_interval,
                "linear backoff max below min; sequence saturates after the first interval"
            );
        }

        Self {
            min_interval,
            add_interval,
            max_interval,
            current: min_interval,
        }
    }

    /// Like [`LinearBackoff::new`], but rejects `max_interval < min_interval`.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use backoff_gen::{ConfigError, LinearBackoff};
    ///
    /// let err = LinearBackoff::try_new(
    ///     Duration::from_secs(2),
    ///     Duration::from_secs(1),
    ///     Duration::from_secs(1),
    /// )
    /// .unwrap_err();
    /// assert_eq!(err.as_label(), "config_inverted_bounds");
    /// ```
    pub fn try_new(
        min_interval: Duration,
        add_interval: Duration,
        max_interval: Duration,
    ) -> Result<Self> {
        if max_interval < min_interval {
            return Err(ConfigError::InvertedBounds {
                min: min_interval,
                max: max_interval,
            });
        }
        Ok(Self::new(min_interval, add_interval, max_interval))
    }

    /// Creates a generator which always returns `interval`.
    pub fn constant(interval: Duration) -> Self {
        Self::new(interval, Duration::ZERO, interval)
    }

    /// Creates a generator which always returns a zero interval.
    pub fn zero() -> Self {
        Self::constant(Duration::ZERO)
    }

    /// Returns a copy with the same configuration at the initial position.
    pub fn fresh(&self) -> Self {
        Self::new(self.min_interval, self.add_interval, self.max_interval)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn add_interval(&self) -> Duration {
        self.add_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        tracing::trace!(current = ?self.current, "linear backoff reset");
        self.current = self.min_interval;
    }

    /// Returns the cursor, then advances it by `add_interval` while it stays at or
    /// below `max_interval − add_interval`; otherwise clamps it to `max_interval`.
    fn next_interval(&mut self) -> Duration {
        let current = self.current;

        match self.max_interval.checked_sub(self.add_interval) {
            Some(limit) if current <= limit => self.current = current + self.add_interval,
            _ => self.current = self.max_interval,
        }

        current
    }

    fn fork(&self) -> Box<dyn Backoff> {
        Box::new(self.fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::tests::assert_sequence;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_zero_backoff() {
        let mut b = LinearBackoff::zero();
        assert_sequence(&mut b, MS, &[0, 0, 0, 0]);
        b.reset();
        assert_sequence(&mut b, MS, &[0, 0, 0, 0]);
    }

    #[test]
    fn test_constant_backoff() {
        let mut b1 = LinearBackoff::constant(Duration::from_secs(25));
        let mut b2 = LinearBackoff::constant(Duration::from_secs(50 * 60));
        let minute = Duration::from_secs(60);

        assert_sequence(&mut b1, Duration::from_secs(1), &[25, 25, 25, 25]);
        b2.reset();
        assert_sequence(&mut b2, minute, &[50, 50, 50, 50]);

        assert_sequence(&mut b1, Duration::from_secs(1), &[25, 25, 25, 25]);
        b1.reset();
        assert_sequence(&mut b2, minute, &[50, 50, 50, 50]);
    }

    #[test]
    fn test_linear_saturates_at_max() {
        let mut b = LinearBackoff::new(MS, MS, 4 * MS);
        assert_sequence(&mut b, MS, &[1, 2, 3, 4, 4, 4]);
        b.reset();
        assert_sequence(&mut b, MS, &[1, 2, 3, 4, 4, 4]);
    }

    #[test]
    fn test_step_overshooting_max_clamps() {
        let mut b = LinearBackoff::new(MS, 3 * MS, 5 * MS);
        assert_sequence(&mut b, MS, &[1, 4, 5, 5]);
    }

    #[test]
    fn test_step_larger_than_max() {
        let mut b = LinearBackoff::new(MS, 10 * MS, 5 * MS);
        assert_sequence(&mut b, MS, &[1, 5, 5]);
    }

    #[test]
    fn test_inverted_bounds_degrade() {
        let mut b = LinearBackoff::new(10 * MS, MS, 4 * MS);
        assert_sequence(&mut b, MS, &[10, 4, 4, 4]);
    }

    #[test]
    fn test_try_new_rejects_inverted_bounds() {
        let err = LinearBackoff::try_new(10 * MS, MS, 4 * MS).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvertedBounds {
                min: 10 * MS,
                max: 4 * MS
            }
        );

        let ok = LinearBackoff::try_new(MS, MS, 4 * MS).unwrap();
        assert_eq!(ok, LinearBackoff::new(MS, MS, 4 * MS));
    }

    #[test]
    fn test_huge_max_does_not_overflow() {
        let mut b = LinearBackoff::new(Duration::MAX - MS, MS, Duration::MAX);
        assert_eq!(b.next_interval(), Duration::MAX - MS);
        assert_eq!(b.next_interval(), Duration::MAX);
        assert_eq!(b.next_interval(), Duration::MAX);
    }

    #[test]
    fn test_accessors() {
        let b = LinearBackoff::new(MS, 2 * MS, 4 * MS);
        assert_eq!(b.min_interval(), MS);
        assert_eq!(b.add_interval(), 2 * MS);
        assert_eq!(b.max_interval(), 4 * MS);
    }

    #[test]
    fn test_fresh_keeps_config_and_resets_cursor() {
        let mut b = LinearBackoff::new(MS, 2 * MS, 4 * MS);
        b.next_interval();
        b.next_interval();

        let mut c = b.fresh();
        assert_eq!(c.min_interval(), MS);
        assert_eq!(c.add_interval(), 2 * MS);
        assert_eq!(c.max_interval(), 4 * MS);
        assert_sequence(&mut c, MS, &[1, 3, 4]);
    }
}
