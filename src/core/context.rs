//! # Event context handed to hooks.
//!
//! [`EventContext`] is a read-only view over the run state of the attempt that just
//! finished, plus the constructors of every [`Signal`] a hook may return. It borrows
//! from the engine's loop, so it cannot outlive the attempt that created it.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{EventContext, HookResult};
//!
//! fn on_result(ctx: &EventContext<'_, u16, std::io::Error>) -> HookResult<u16, std::io::Error> {
//!     match ctx.result() {
//!         Some(503) => Ok(ctx.static_backoff(Duration::from_millis(250))),
//!         Some(429) => Ok(ctx.exponential_backoff()),
//!         _ => Ok(ctx.accept()),
//!     }
//! }
//! ```

use std::time::Duration;

use crate::core::signal::{BackoffRequest, Signal};
use crate::core::stats::RunStats;
use crate::policies::BackoffPolicy;

/// Snapshot of the current attempt plus signal constructors.
pub struct EventContext<'a, T, E> {
    stats: &'a RunStats,
    result: Option<&'a T>,
    error: Option<&'a E>,
}

impl<'a, T, E> EventContext<'a, T, E> {
    pub(crate) fn with_result(stats: &'a RunStats, result: &'a T) -> Self {
        Self {
            stats,
            result: Some(result),
            error: None,
        }
    }

    pub(crate) fn with_error(stats: &'a RunStats, error: &'a E) -> Self {
        Self {
            stats,
            result: None,
            error: Some(error),
        }
    }

    // ---- Read accessors ----

    /// 0-based index of the attempt that just ran.
    pub fn attempt(&self) -> u32 {
        self.stats.attempt()
    }

    /// Configured retry budget.
    pub fn max_retries(&self) -> u32 {
        self.stats.max_retries()
    }

    /// Attempts executed so far, resets included.
    pub fn attempts(&self) -> u32 {
        self.stats.attempts()
    }

    /// Attempts beyond the first one.
    pub fn retries(&self) -> u32 {
        self.stats.retries()
    }

    /// Duration of the attempt that just ran.
    pub fn elapsed(&self) -> Duration {
        self.stats.elapsed()
    }

    /// Sum of all waits of this run.
    pub fn total_backoff(&self) -> Duration {
        self.stats.total_backoff()
    }

    /// Wait that preceded this attempt.
    pub fn last_backoff(&self) -> Duration {
        self.stats.last_backoff()
    }

    /// `true` when a retry-type signal would end the loop instead.
    pub fn is_final_attempt(&self) -> bool {
        self.stats.is_final_attempt()
    }

    /// Value of the attempt, `None` if it failed.
    pub fn result(&self) -> Option<&'a T> {
        self.result
    }

    /// Error of the attempt, `None` if it succeeded.
    pub fn error(&self) -> Option<&'a E> {
        self.error
    }

    /// Full statistics of the run so far.
    pub fn stats(&self) -> &'a RunStats {
        self.stats
    }

    // ---- Signals ----

    /// Accept the current outcome.
    pub fn stop(&self) -> Signal<T, E> {
        Signal::Stop
    }

    /// Alias of [`stop`](Self::stop).
    pub fn accept(&self) -> Signal<T, E> {
        Signal::Stop
    }

    /// Alias of [`stop`](Self::stop), reads better from an error hook.
    pub fn fail(&self) -> Signal<T, E> {
        Signal::Stop
    }

    /// Run the next attempt immediately.
    pub fn retry(&self) -> Signal<T, E> {
        Signal::Retry
    }

    /// Wait `2^attempt + U(0,1)` seconds, then retry.
    pub fn delay_retry(&self) -> Signal<T, E> {
        Signal::DelayRetry
    }

    /// Wait as the configured backoff strategy says, then retry.
    pub fn backoff(&self) -> Signal<T, E> {
        Signal::Backoff(BackoffRequest::Strategy)
    }

    /// Wait exactly `delay`, then retry.
    pub fn static_backoff(&self, delay: Duration) -> Signal<T, E> {
        Signal::Backoff(BackoffRequest::Fixed(delay))
    }

    /// Wait `2^attempt + U(0,1)` seconds (computed now), then retry.
    pub fn exponential_backoff(&self) -> Signal<T, E> {
        let delay = BackoffPolicy::default().next(self.attempt());
        Signal::Backoff(BackoffRequest::Fixed(delay))
    }

    /// Call `work` from the next attempt on, without touching the budget.
    pub fn swap_work<F>(&self, work: F) -> Signal<T, E>
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
    {
        Signal::Swap(Box::new(work))
    }

    /// Restart the attempt budget with the same work function.
    pub fn reset(&self) -> Signal<T, E> {
        Signal::Reset(None)
    }

    /// Restart the attempt budget and call `work` from now on.
    pub fn reset_and_run<F>(&self, work: F) -> Signal<T, E>
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
    {
        Signal::Reset(Some(Box::new(work)))
    }
}
