//! # Exponential backoff with jitter.
//!
//! [`ExponentialBackoff`] grows retry delays geometrically. It is parameterized by:
//! - [`ExponentialConfig::min`] the first interval;
//! - [`ExponentialConfig::max`] the saturation cap;
//! - [`ExponentialConfig::multiplier`] the growth factor;
//! - [`ExponentialConfig::random_factor`] the jitter ratio in `[0, 1)`.
//!
//! The base interval after `n` failed attempts in the current sequence is
//! `min × multiplier^n`. The returned value is a uniform draw from
//! `[base·(1−random_factor), base·(1+random_factor)]`, clamped to `max`.
//!
//! The largest `n` for which the base stays within `max` is computed once at
//! construction. Past it the generator returns `max` without touching the
//! exponential, so long-running sequences can never overflow.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use backoff_gen::{Backoff, ExponentialBackoff};
//!
//! let ms = Duration::from_millis;
//! let mut backoff = ExponentialBackoff::new(ms(1), ms(4));
//!
//! assert_eq!(backoff.next_interval(), ms(1));
//! assert_eq!(backoff.next_interval(), ms(2));
//! assert_eq!(backoff.next_interval(), ms(4));
//! // Saturated.
//! assert_eq!(backoff.next_interval(), ms(4));
//! ```

use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::generators::Backoff;
use crate::jitter::JitterSource;

const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_RANDOM_FACTOR: f64 = 0.0;

/// Smallest usable minimum; a zero minimum is replaced by it.
const MIN_INTERVAL_FLOOR: Duration = Duration::from_nanos(1);

/// Configuration of an [`ExponentialBackoff`].
///
/// All fields are public; start from [`ExponentialConfig::default`] and override what
/// you need, or use [`ExponentialBackoff::builder`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExponentialConfig {
    /// First interval of a sequence (`0` is replaced by 1ns).
    pub min: Duration,
    /// Saturation cap.
    pub max: Duration,
    /// Growth factor (`> 1.0` for growth).
    pub multiplier: f64,
    /// Jitter ratio, `0.0` disables jitter.
    pub random_factor: f64,
}

impl Default for ExponentialConfig {
    /// Returns a config with:
    /// - `min = 10ms`;
    /// - `max = 10min`;
    /// - `multiplier = 2.0`;
    /// - `random_factor = 0.0` (deterministic).
    fn default() -> Self {
        Self {
            min: Duration::from_millis(10),
            max: Duration::from_secs(10 * 60),
            multiplier: DEFAULT_MULTIPLIER,
            random_factor: DEFAULT_RANDOM_FACTOR,
        }
    }
}

impl ExponentialConfig {
    /// Checks the configuration strictly.
    ///
    /// Rejects `max < min`, a multiplier that is not finite or not above `1.0`, and a
    /// random factor outside `[0, 1)`. A zero `min` is accepted (it is substituted).
    pub fn validate(&self) -> Result<()> {
        if self.max < self.min {
            return Err(ConfigError::InvertedBounds {
                min: self.min,
                max: self.max,
            });
        }
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(ConfigError::InvalidMultiplier {
                multiplier: self.multiplier,
            });
        }
        if !(0.0..1.0).contains(&self.random_factor) {
            return Err(ConfigError::InvalidRandomFactor {
                random_factor: self.random_factor,
            });
        }
        Ok(())
    }
}

/// Fluent builder for [`ExponentialBackoff`].
#[derive(Clone, Debug)]
pub struct ExponentialBuilder {
    config: ExponentialConfig,
    jitter: JitterSource,
}

impl ExponentialBuilder {
    /// Creates a builder with the given bounds and default multiplier/random factor.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            config: ExponentialConfig {
                min,
                max,
                ..ExponentialConfig::default()
            },
            jitter: JitterSource::default(),
        }
    }

    /// Sets the base of the exponential (default `2.0`).
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.config.multiplier = multiplier;
        self
    }

    /// Sets the jitter ratio (default `0.0`, no randomness).
    pub fn with_random_factor(mut self, random_factor: f64) -> Self {
        self.config.random_factor = random_factor;
        self
    }

    /// Draws jitter from a deterministic generator seeded with `seed`.
    ///
    /// Forks of a seeded generator replay the same jitter, so callers sharing one
    /// seeded template retry in lockstep; keep seeds for tests and reproductions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.jitter = JitterSource::seeded(seed);
        self
    }

    /// Sets the jitter source explicitly.
    pub fn with_jitter_source(mut self, jitter: JitterSource) -> Self {
        self.jitter = jitter;
        self
    }

    /// Builds the generator without validation; degenerate values degrade instead of failing.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff::from_config_with_jitter(self.config, self.jitter)
    }

    /// Builds the generator, rejecting invalid configuration.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use backoff_gen::ExponentialBackoff;
    ///
    /// let err = ExponentialBackoff::builder(Duration::from_millis(1), Duration::from_secs(1))
    ///     .with_random_factor(1.0)
    ///     .try_build()
    ///     .unwrap_err();
    /// assert_eq!(err.as_label(), "config_invalid_random_factor");
    /// ```
    pub fn try_build(self) -> Result<ExponentialBackoff> {
        self.config.validate()?;
        Ok(self.build())
    }
}

/// Exponential backoff interval generator.
///
/// See the [module documentation](self) for the sequence definition.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    min_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    random_factor: f64,
    attempts: u32,
    max_attempts: u32,
    jitter: JitterSource,
}

impl ExponentialBackoff {
    /// Creates a generator with `multiplier = 2.0` and no jitter.
    pub fn new(min_interval: Duration, max_interval: Duration) -> Self {
        Self::builder(min_interval, max_interval).build()
    }

    /// Starts a builder with the given bounds.
    pub fn builder(min_interval: Duration, max_interval: Duration) -> ExponentialBuilder {
        ExponentialBuilder::new(min_interval, max_interval)
    }

    /// Creates a generator from a config, drawing jitter from the thread-local generator.
    pub fn from_config(config: ExponentialConfig) -> Self {
        Self::from_config_with_jitter(config, JitterSource::default())
    }

    /// Creates a generator from a config and an explicit jitter source.
    pub fn from_config_with_jitter(config: ExponentialConfig, jitter: JitterSource) -> Self {
        let min_interval = if config.min.is_zero() {
            tracing::debug!(
                substitute = ?MIN_INTERVAL_FLOOR,
                "exponential backoff min interval is zero; substituting"
            );
            MIN_INTERVAL_FLOOR
        } else {
            config.min
        };

        let max_attempts = max_attempts(min_interval, config.max, config.multiplier);
        if max_attempts == 0 {
            tracing::debug!(
                min = ?min_interval,
                max = ?config.max,
                multiplier = config.multiplier,
                "exponential backoff saturates immediately"
            );
        }

        Self {
            min_interval,
            max_interval: config.max,
            multiplier: config.multiplier,
            random_factor: config.random_factor,
            attempts: 0,
            max_attempts,
            jitter,
        }
    }

    /// Returns a copy with the same configuration at the initial position.
    ///
    /// A seeded jitter source restarts from its seed.
    pub fn fresh(&self) -> Self {
        Self {
            attempts: 0,
            jitter: self.jitter.fresh(),
            ..self.clone()
        }
    }

    /// Returns the effective configuration (with the substituted minimum, if any).
    pub fn config(&self) -> ExponentialConfig {
        ExponentialConfig {
            min: self.min_interval,
            max: self.max_interval,
            multiplier: self.multiplier,
            random_factor: self.random_factor,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn random_factor(&self) -> f64 {
        self.random_factor
    }

    /// Number of growing intervals before the sequence saturates at the maximum.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Backoff for ExponentialBackoff {
    fn reset(&mut self) {
        tracing::trace!(attempts = self.attempts, "exponential backoff reset");
        self.attempts = 0;
    }

    fn next_interval(&mut self) -> Duration {
        if self.attempts >= self.max_attempts {
            return self.max_interval;
        }

        let base = self.min_interval.as_nanos() as f64 * self.multiplier.powi(self.attempts as i32);
        self.attempts += 1;
        if self.attempts == self.max_attempts {
            tracing::trace!(max = ?self.max_interval, "exponential backoff reached its ceiling");
        }

        let jittered = self.jitter.jitter(base, self.random_factor);
        nanos_to_duration(whole_nanos(jittered, base, self.random_factor)).min(self.max_interval)
    }

    fn fork(&self) -> Box<dyn Backoff> {
        Box::new(self.fresh())
    }
}

/// Largest `n` such that `min × multiplier^n <= max`, capped at `i32::MAX`.
///
/// Estimated with logarithms, then corrected one step each way against the
/// actual power so float rounding (`ln 4 / ln 2 = 1.999…`) cannot lose an attempt.
fn max_attempts(min: Duration, max: Duration, multiplier: f64) -> u32 {
    const CAP: u32 = i32::MAX as u32;

    if max < min {
        return 0;
    }

    let min = min.as_nanos() as f64;
    let max = max.as_nanos() as f64;
    let estimate = (max / min).ln() / multiplier.ln();

    if estimate.is_nan() || estimate <= 0.0 {
        return 0;
    }
    if !estimate.is_finite() || estimate >= CAP as f64 {
        return CAP;
    }

    let fits = |n: u32| min * multiplier.powi(n as i32) <= max;
    let mut n = estimate as u32;
    if n < CAP && fits(n + 1) {
        n += 1;
    } else if n > 0 && !fits(n) {
        n -= 1;
    }
    n
}

/// Rounds a jittered value to whole nanoseconds inside `[base·(1−ratio), base·(1+ratio)]`,
/// never below 1ns.
fn whole_nanos(jittered: f64, base: f64, ratio: f64) -> f64 {
    let ratio = ratio.max(0.0);
    let lo = (base * (1.0 - ratio)).max(0.0).ceil().max(1.0);
    let hi = (base * (1.0 + ratio)).floor();
    let rounded = jittered.round();
    if lo <= hi {
        rounded.clamp(lo, hi)
    } else {
        rounded.max(1.0)
    }
}

/// Converts a non-negative nanosecond count to a [`Duration`], saturating.
fn nanos_to_duration(nanos: f64) -> Duration {
    if nanos.is_nan() || nanos <= 0.0 {
        return Duration::ZERO;
    }
    let nanos = nanos.round();
    if nanos >= u64::MAX as f64 {
        let secs = nanos / 1e9;
        if secs >= u64::MAX as f64 {
            return Duration::MAX;
        }
        return Duration::from_secs_f64(secs);
    }
    Duration::from_nanos(nanos as u64)
}
