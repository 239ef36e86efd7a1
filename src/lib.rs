//! # backoff-gen
//!
//! **backoff-gen** computes the delays a retry loop should wait between attempts.
//!
//! It does not run the retried operation, sleep, or schedule timers: a generator is a
//! plain value that hands out one [`Duration`](std::time::Duration) per failed attempt
//! and starts over when told to.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                      ┌───────────────────────────────┐
//!                      │        Backoff (trait)        │
//!                      │  reset / next_interval / fork │
//!                      └───────┬───────────────┬───────┘
//!                              ▼               ▼
//!               ┌─────────────────────┐ ┌──────────────────────────┐
//!               │    LinearBackoff    │ │    ExponentialBackoff    │
//!               │  min + n·add ≤ max  │ │ min·mult^n ± jitter ≤ max│
//!               │ (zero, constant too)│ │ ceiling precomputed once │
//!               └─────────────────────┘ └────────────┬─────────────┘
//!                                                    ▼
//!                                        ┌──────────────────────┐
//!                                        │     JitterSource     │
//!                                        │ thread rng / seeded  │
//!                                        └──────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! configure ──► generator (position 0)
//!
//! loop {
//!   ├─► op() ─ Ok  ──► backoff.reset(), done
//!   └─► op() ─ Err ──► delay = backoff.next_interval()   (position += 1)
//!                      caller sleeps(delay) with its own timer/cancellation
//! }
//!
//! template ──► fork() ──► independent generator per retry sequence
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Contract**      | One small interface shared by every policy.                  | [`Backoff`], [`Intervals`]                  |
//! | **Policies**      | Zero, constant, linear and exponential sequences.            | [`LinearBackoff`], [`ExponentialBackoff`]   |
//! | **Jitter**        | Symmetric randomization, injectable seed for tests.          | [`JitterSource`]                            |
//! | **Configuration** | Plain config struct with defaults, fluent builder.           | [`ExponentialConfig`], [`ExponentialBuilder`] |
//! | **Errors**        | Strict validation for callers who prefer to fail loudly.     | [`ConfigError`]                             |
//!
//! ## Optional features
//! - `serde`: derives `Serialize`/`Deserialize` for [`ExponentialConfig`].
//!
//! ## Logging
//! Diagnostics go through [`tracing`]: `debug` when a lenient constructor degrades a
//! configuration, `trace` on reset and when an exponential sequence reaches its ceiling.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use backoff_gen::{Backoff, ExponentialBackoff};
//!
//! let template = ExponentialBackoff::builder(Duration::from_millis(100), Duration::from_secs(30))
//!     .with_random_factor(0.2)
//!     .try_build()
//!     .expect("valid config");
//!
//! // One generator per retry sequence.
//! let mut backoff = template.fork();
//!
//! let mut attempt = 0;
//! let result: Result<(), &str> = loop {
//!     attempt += 1;
//!     let outcome = if attempt < 3 { Err("unavailable") } else { Ok(()) };
//!     match outcome {
//!         Ok(()) => {
//!             backoff.reset();
//!             break Ok(());
//!         }
//!         Err(_) if attempt >= 5 => break outcome,
//!         Err(_) => {
//!             let delay = backoff.next_interval();
//!             assert!(delay <= Duration::from_secs(30));
//!             // std::thread::sleep(delay) or tokio::time::sleep(delay).await
//!         }
//!     }
//! };
//! assert!(result.is_ok());
//! ```
mod error;
mod generators;
mod jitter;

// ---- Public re-exports ----

pub use error::{ConfigError, Result};
pub use generators::{
    Backoff, ExponentialBackoff, ExponentialBuilder, ExponentialConfig, Intervals, LinearBackoff,
};
pub use jitter::JitterSource;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn test_retry_loop_sleeps_generated_intervals() {
        let mut backoff = ExponentialBackoff::new(Duration::from_millis(100), Duration::from_secs(1));
        let started = Instant::now();

        let mut failures = 0;
        while failures < 3 {
            failures += 1;
            tokio::time::sleep(backoff.next_interval()).await;
        }
        backoff.reset();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(700), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(710), "{elapsed:?}");
        assert_eq!(backoff.next_interval(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_wait_is_cancellable() {
        let token = CancellationToken::new();
        let child = token.clone();

        let waiter = tokio::spawn(async move {
            let mut backoff = LinearBackoff::constant(Duration::from_secs(60));
            let mut waits = 0u32;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break waits,
                    _ = tokio::time::sleep(backoff.next_interval()) => waits += 1,
                }
            }
        });

        tokio::time::sleep(Duration::from_secs(150)).await;
        token.cancel();

        assert_eq!(waiter.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_boxed_generator_moves_into_task() {
        let template: Box<dyn Backoff> = Box::new(LinearBackoff::new(
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_millis(3),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mut backoff = template.fork();
                tokio::spawn(async move { backoff.intervals().take(4).collect::<Vec<_>>() })
            })
            .collect();

        let ms = Duration::from_millis;
        for handle in handles {
            assert_eq!(handle.await.unwrap(), [ms(1), ms(2), ms(3), ms(3)]);
        }
    }
}
