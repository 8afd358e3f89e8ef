//! # Engine configuration.
//!
//! Provides [`RetryConfig`], plain settings that seed a
//! [`RetryBuilder`](crate::RetryBuilder) via [`Retry::from_config`](crate::Retry::from_config).
//! Hooks, matchers and subscribers are code, not data, so they stay on the builder.
//!
//! ## Sentinel values
//! - `max_retries = 0` → a single attempt, errors propagate immediately
//! - `backoff = None` → no strategy; `ctx.backoff()` then fails the run

use crate::policies::BackoffPolicy;

/// Plain configuration for the retry engine.
///
/// ## Field semantics
/// - `max_retries`: attempts allowed after the first one
/// - `short_circuit`: propagate the first error, ignoring catchable kinds
/// - `backoff`: policy of the strategy used by `ctx.backoff()`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetryConfig {
    /// Attempts allowed after the first one.
    pub max_retries: u32,

    /// Bypass suppression: every error is terminal on first sight.
    ///
    /// Hooks still run; only the automatic retry of catchable errors is disabled.
    pub short_circuit: bool,

    /// Backoff policy installed as a [`DefaultBackoff`](crate::DefaultBackoff).
    pub backoff: Option<BackoffPolicy>,
}

impl RetryConfig {
    /// Upper bound of attempts without resets (`max_retries + 1`).
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_attempt() {
        let cfg = RetryConfig::default();
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.max_attempts(), 1);
        assert!(!cfg.short_circuit);
        assert!(cfg.backoff.is_none());
    }

    #[test]
    fn test_max_attempts_saturates() {
        let cfg = RetryConfig {
            max_retries: u32::MAX,
            ..RetryConfig::default()
        };
        assert_eq!(cfg.max_attempts(), u32::MAX);
    }
}
