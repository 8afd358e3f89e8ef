//! # Backoff policies and strategies.
//!
//! [`BackoffPolicy`] is the plain parameter set:
//! - [`BackoffPolicy::first`] the delay for attempt 0;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the cap applied before jitter;
//! - [`BackoffPolicy::jitter`] randomization on top of the capped base.
//!
//! The delay for attempt `n` is `first × factor^n`, clamped to `max`, then jittered.
//! The base is derived purely from the attempt number, so jitter output never
//! feeds back into later delays.
//!
//! [`BackoffStrategy`] is the seam the engine calls when a hook asks for a
//! strategy-driven backoff. [`DefaultBackoff`] wraps a policy and keeps a running
//! total of every duration it has produced.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! // 100ms × 2^10 = 102_400ms → capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay for attempt 0.
    pub first: Duration,
    /// Maximum delay before jitter.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter applied to the capped base.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the classic exponential schedule `2^attempt + uniform(0, 1)` seconds:
    /// - `first = 1s`;
    /// - `factor = 2.0`;
    /// - `max = 1h`;
    /// - `jitter = Additive { spread: 1s }`.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(60 * 60),
            factor: 2.0,
            jitter: JitterPolicy::Additive {
                spread: Duration::from_secs(1),
            },
        }
    }
}

impl BackoffPolicy {
    /// Policy that always yields `delay`, whatever the attempt.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// # Notes
    /// - If `factor` equals 1.0, delay remains constant at `first` (up to `max`).
    /// - If `factor` is greater than 1.0, delays grow exponentially up to `max`.
    /// - Non-finite or negative intermediate values clamp to `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        self.jitter.apply(base)
    }
}

/// Maps an attempt index to a wait duration.
///
/// Implementations may keep internal bookkeeping (hence `&self` plus `Sync`):
/// the engine only calls [`compute`](BackoffStrategy::compute) and never uses
/// [`total`](BackoffStrategy::total) for control decisions.
pub trait BackoffStrategy: Send + Sync {
    /// Returns how long to wait after the given 0-based attempt.
    fn compute(&self, attempt: u32) -> Duration;

    /// Total duration produced so far (diagnostic only).
    fn total(&self) -> Duration {
        Duration::ZERO
    }
}

impl BackoffStrategy for BackoffPolicy {
    fn compute(&self, attempt: u32) -> Duration {
        self.next(attempt)
    }
}

impl<S: BackoffStrategy + ?Sized> BackoffStrategy for Arc<S> {
    fn compute(&self, attempt: u32) -> Duration {
        (**self).compute(attempt)
    }

    fn total(&self) -> Duration {
        (**self).total()
    }
}

/// Strategy backed by a [`BackoffPolicy`] that accumulates what it produces.
///
/// Keep an `Arc` clone to read [`total`](BackoffStrategy::total) after a run:
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use retryvisor::{BackoffStrategy, DefaultBackoff};
///
/// let strategy = Arc::new(DefaultBackoff::fixed(Duration::from_secs(2)));
/// assert_eq!(strategy.compute(0), Duration::from_secs(2));
/// assert_eq!(strategy.compute(7), Duration::from_secs(2));
/// assert_eq!(strategy.total(), Duration::from_secs(4));
/// ```
#[derive(Debug, Default)]
pub struct DefaultBackoff {
    policy: BackoffPolicy,
    produced_nanos: AtomicU64,
}

impl DefaultBackoff {
    /// Exponential `2^attempt + uniform(0, 1)` seconds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant `delay`, attempt index ignored.
    pub fn fixed(delay: Duration) -> Self {
        Self::with_policy(BackoffPolicy::constant(delay))
    }

    /// Any custom policy.
    pub fn with_policy(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            produced_nanos: AtomicU64::new(0),
        }
    }

    /// The wrapped policy.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

impl BackoffStrategy for DefaultBackoff {
    fn compute(&self, attempt: u32) -> Duration {
        let delay = self.policy.next(attempt);
        let nanos = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        // Saturate instead of wrapping; the update closure never returns None.
        let _ = self
            .produced_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                Some(cur.saturating_add(nanos))
            });
        delay
    }

    fn total(&self) -> Duration {
        Duration::from_nanos(self.produced_nanos.load(Ordering::Relaxed))
    }
}
