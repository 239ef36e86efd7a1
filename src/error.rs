//! Error types used by the strict construction path.
//!
//! Generators never fail once built: [`Backoff::next_interval`](crate::Backoff::next_interval)
//! and [`Backoff::reset`](crate::Backoff::reset) are total. The only failure class is a
//! misconfiguration, and it is reported only by the validating constructors:
//!
//! - [`LinearBackoff::try_new`](crate::LinearBackoff::try_new)
//! - [`ExponentialBuilder::try_build`](crate::ExponentialBuilder::try_build)
//! - [`ExponentialConfig::validate`](crate::ExponentialConfig::validate)
//!
//! The lenient constructors accept the same inputs and degrade instead
//! (immediate saturation, substituted minimum).

use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results carrying a [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// # Errors produced by validating generator configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The maximum interval is below the minimum interval.
    #[error("max interval {max:?} is below min interval {min:?}")]
    InvertedBounds {
        /// The configured minimum interval.
        min: Duration,
        /// The configured maximum interval.
        max: Duration,
    },

    /// The exponential multiplier is not a finite number greater than one.
    #[error("multiplier {multiplier} must be finite and greater than 1")]
    InvalidMultiplier {
        /// The rejected multiplier.
        multiplier: f64,
    },

    /// The random factor is outside `[0, 1)`.
    #[error("random factor {random_factor} must be within [0, 1)")]
    InvalidRandomFactor {
        /// The rejected random factor.
        random_factor: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use backoff_gen::ConfigError;
    ///
    /// let err = ConfigError::InvalidMultiplier { multiplier: 0.5 };
    /// assert_eq!(err.as_label(), "config_invalid_multiplier");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvertedBounds { .. } => "config_inverted_bounds",
            ConfigError::InvalidMultiplier { .. } => "config_invalid_multiplier",
            ConfigError::InvalidRandomFactor { .. } => "config_invalid_random_factor",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::InvertedBounds { min, max } => {
                format!("inverted bounds: min={min:?} max={max:?}")
            }
            ConfigError::InvalidMultiplier { multiplier } => {
                format!("invalid multiplier: {multiplier}")
            }
            ConfigError::InvalidRandomFactor { random_factor } => {
                format!("invalid random factor: {random_factor}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let bounds = ConfigError::InvertedBounds {
            min: Duration::from_secs(2),
            max: Duration::from_secs(1),
        };
        assert_eq!(bounds.as_label(), "config_inverted_bounds");
        assert_eq!(
            ConfigError::InvalidRandomFactor { random_factor: 1.5 }.as_label(),
            "config_invalid_random_factor"
        );
    }

    #[test]
    fn display_includes_values() {
        let err = ConfigError::InvertedBounds {
            min: Duration::from_millis(5),
            max: Duration::from_millis(1),
        };
        assert_eq!(err.to_string(), "max interval 1ms is below min interval 5ms");
        assert_eq!(err.as_message(), "inverted bounds: min=5ms max=1ms");
    }
}
