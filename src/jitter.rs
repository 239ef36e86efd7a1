//! # Jitter for retry intervals.
//!
//! [`JitterSource`] owns the randomness used to perturb a computed interval so that
//! many callers retrying the same dependency do not wake up in lockstep.
//!
//! - [`JitterSource::thread`] draws from the thread-local generator (`rand::rng()`).
//! - [`JitterSource::seeded`] draws from a [`StdRng`] seeded with a fixed value,
//!   giving reproducible sequences in tests.
//!
//! The perturbation itself is symmetric: a value `v` with ratio `r` becomes a uniform
//! draw from the closed interval `[v·(1−r), v·(1+r)]`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random source used to jitter intervals.
///
/// Defaults to the thread-local generator.
#[derive(Clone, Debug, Default)]
pub struct JitterSource {
    inner: Source,
}

#[derive(Clone, Debug, Default)]
enum Source {
    #[default]
    Thread,
    Seeded {
        seed: u64,
        rng: StdRng,
    },
}

impl JitterSource {
    /// Uses the process-wide thread-local generator.
    pub fn thread() -> Self {
        Self {
            inner: Source::Thread,
        }
    }

    /// Uses a deterministic generator seeded with `seed`.
    ///
    /// Every [`fresh`](Self::fresh) copy replays the same draws, so a seeded source
    /// shared as a template makes its users retry in lockstep; use it for tests.
    ///
    /// # Example
    /// ```
    /// use backoff_gen::JitterSource;
    ///
    /// let mut a = JitterSource::seeded(7);
    /// let mut b = JitterSource::seeded(7);
    /// assert_eq!(a.jitter(1000.0, 0.5), b.jitter(1000.0, 0.5));
    /// ```
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Source::Seeded {
                seed,
                rng: StdRng::seed_from_u64(seed),
            },
        }
    }

    /// Returns the seed of a deterministic source, `None` for the thread source.
    pub fn seed(&self) -> Option<u64> {
        match &self.inner {
            Source::Thread => None,
            Source::Seeded { seed, .. } => Some(*seed),
        }
    }

    /// Returns a source in its initial state.
    ///
    /// A seeded source restarts from its seed; the thread source is shared anyway.
    pub fn fresh(&self) -> Self {
        match self.seed() {
            Some(seed) => Self::seeded(seed),
            None => Self::thread(),
        }
    }

    /// Draws uniformly from `[value·(1−ratio), value·(1+ratio)]`.
    ///
    /// A zero ratio (or zero value) returns `value` exactly without consuming randomness.
    /// The lower bound never drops below zero, and a range that cannot be sampled
    /// (non-finite bounds) falls back to `value`.
    pub fn jitter(&mut self, value: f64, ratio: f64) -> f64 {
        if ratio <= 0.0 || value <= 0.0 || !value.is_finite() {
            return value;
        }

        let lo = (value * (1.0 - ratio)).max(0.0);
        let hi = value * (1.0 + ratio);
        if !hi.is_finite() || lo >= hi {
            return value;
        }

        match &mut self.inner {
            Source::Thread => rand::rng().random_range(lo..=hi),
            Source::Seeded { rng, .. } => rng.random_range(lo..=hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ratio_is_exact() {
        let mut source = JitterSource::thread();
        for value in [0.0, 1.0, 1_000_000.0, 123_456.789] {
            assert_eq!(source.jitter(value, 0.0), value);
        }
    }

    #[test]
    fn test_zero_value_stays_zero() {
        let mut source = JitterSource::seeded(1);
        assert_eq!(source.jitter(0.0, 0.5), 0.0);
    }

    #[test]
    fn test_bounds_hold() {
        let mut source = JitterSource::thread();
        for _ in 0..1_000 {
            let v = source.jitter(1_000.0, 0.25);
            assert!((750.0..=1_250.0).contains(&v), "{v} out of bounds");
        }
    }

    #[test]
    fn test_ratio_above_one_never_negative() {
        let mut source = JitterSource::seeded(99);
        for _ in 0..1_000 {
            let v = source.jitter(1_000.0, 1.5);
            assert!(v >= 0.0 && v <= 2_500.0, "{v} out of bounds");
        }
    }

    #[test]
    fn test_non_finite_upper_bound_falls_back() {
        let mut source = JitterSource::thread();
        assert_eq!(source.jitter(f64::MAX, 0.5), f64::MAX);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = JitterSource::seeded(42);
        let mut b = JitterSource::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.jitter(10_000.0, 0.3), b.jitter(10_000.0, 0.3));
        }
    }

    #[test]
    fn test_fresh_restarts_seeded_stream() {
        let mut a = JitterSource::seeded(5);
        let first: Vec<f64> = (0..8).map(|_| a.jitter(500.0, 0.5)).collect();

        let mut b = a.fresh();
        let replay: Vec<f64> = (0..8).map(|_| b.jitter(500.0, 0.5)).collect();
        assert_eq!(first, replay);
        assert_eq!(b.seed(), Some(5));
        assert_eq!(JitterSource::thread().fresh().seed(), None);
    }
}
