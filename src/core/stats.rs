//! # Per-run statistics.
//!
//! [`RunStats`] is the bookkeeping half of a run's state: counters and durations
//! for one work function. The engine creates a fresh value for every work function,
//! lends it to hooks through the [`EventContext`](crate::EventContext) and keeps the
//! last one for introspection after `run` returns.

use std::sync::Arc;
use std::time::Duration;

/// Counters and timings of one work function's run.
///
/// ## Field semantics
/// - `attempt`: 0-based index in `[0, max_retries]`, back to 0 after a reset
/// - `attempts`: every executed attempt, resets included
/// - `elapsed`: wall-clock time of the most recent attempt (not cumulative)
/// - `total_backoff`: every wait of this run, summed
/// - `last_backoff`: the wait that preceded the current attempt (`0` if none)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub(crate) attempt: u32,
    pub(crate) max_retries: u32,
    pub(crate) attempts: u32,
    pub(crate) resets: u32,
    pub(crate) elapsed: Duration,
    pub(crate) total_backoff: Duration,
    pub(crate) last_backoff: Duration,
    pub(crate) last_error: Option<Arc<str>>,
}

impl RunStats {
    pub(crate) fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Current 0-based attempt index.
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Configured retry budget.
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts executed, including those before a reset.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Attempts beyond the first one.
    #[inline]
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// How many times a hook reset the counter.
    #[inline]
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Wall-clock duration of the most recent attempt.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Sum of all waits of this run.
    #[inline]
    pub fn total_backoff(&self) -> Duration {
        self.total_backoff
    }

    /// Wait that preceded the current attempt.
    #[inline]
    pub fn last_backoff(&self) -> Duration {
        self.last_backoff
    }

    /// Message of the most recent failure, if any attempt failed.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` when no retries remain at the current index.
    #[inline]
    pub fn is_final_attempt(&self) -> bool {
        self.attempt >= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats() {
        let stats = RunStats::new(3);
        assert_eq!(stats.max_retries(), 3);
        assert_eq!(stats.attempts(), 0);
        assert_eq!(stats.retries(), 0);
        assert!(!stats.is_final_attempt());
        assert!(stats.last_error().is_none());
    }

    #[test]
    fn test_zero_budget_is_final_immediately() {
        assert!(RunStats::new(0).is_final_attempt());
    }
}
