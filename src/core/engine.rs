//! # Retry: the attempt loop.
//!
//! Runs one work function (or a batch of them) under the configured budget, hooks
//! and backoff.
//!
//! ## Attempt flow
//! ```text
//! loop (attempt = 0..=max_retries) {
//!   ├─► publish AttemptStarting
//!   ├─► work()
//!   │     ├─ Ok(v)  ──► on_result(ctx)? ── none ──► Stop
//!   │     │                  └─ Err(e) ──► treated like a work error
//!   │     └─ Err(e) ──► catchable && retries left && !short_circuit
//!   │                      ├─ yes ─► Retry (hook not consulted)
//!   │                      └─ no  ─► on_error(ctx)? ── none ──► Stop
//!   │                                    └─ Err(e2) ──► catchable check again, else Stop
//!   └─► interpret signal:
//!         Stop        ─► return outcome
//!         Retry       ─► next attempt
//!         DelayRetry  ─► sleep(2^attempt + U(0,1)), next attempt
//!         Backoff(r)  ─► sleep(strategy | fixed), next attempt
//!         Swap(w)     ─► next attempt runs w
//!         Reset(w)    ─► attempt = 0 (swap work if given)
//! }
//! budget exhausted ─► return outcome
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** on the calling thread
//! - No wait follows the final attempt: `DelayRetry`/`Backoff` just end the loop there
//! - `attempts` counts every execution, even across resets
//! - Terminal errors come back as [`RunError::Work`] holding the original value
//!
//! `run` takes `&mut self`: one run at a time per engine, and configuration is
//! frozen while it is in flight. Callers sharing an engine across threads must
//! serialize access themselves (e.g. a `Mutex<Retry<..>>`).

use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    core::{
        builder::RetryBuilder,
        config::RetryConfig,
        context::EventContext,
        signal::{BackoffRequest, Hook, Signal},
        sleeper::Sleeper,
        stats::RunStats,
    },
    error::RunError,
    events::{Event, EventKind},
    policies::{BackoffPolicy, BackoffStrategy},
    subscribers::SubscriberSet,
};

/// Predicate deciding whether an error is catchable.
pub type ErrorMatcher<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

type Work<'w, T, E> = Box<dyn FnMut() -> Result<T, E> + 'w>;

/// Results of [`Retry::run_all`].
///
/// A batch of exactly one work function yields [`Batch::One`]; anything else
/// (including an empty batch) yields [`Batch::Many`] in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Batch<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Batch<T> {
    /// All values in submission order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Batch::One(v) => vec![v],
            Batch::Many(vs) => vs,
        }
    }

    /// The single value, if the batch had exactly one work function.
    pub fn into_one(self) -> Option<T> {
        match self {
            Batch::One(v) => Some(v),
            Batch::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::One(_) => 1,
            Batch::Many(vs) => vs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Retry engine.
///
/// Built with [`Retry::builder`]; reusable across runs, each run starting from
/// fresh [`RunStats`].
///
/// # Example
/// ```rust
/// use std::io;
/// use retryvisor::{InstantSleeper, Retry};
///
/// let mut calls = 0;
/// let mut retry = Retry::builder()
///     .retries(3)
///     .catch(|e: &io::Error| e.kind() == io::ErrorKind::TimedOut)
///     .sleeper(InstantSleeper)
///     .build()?;
///
/// let value = retry.run(|| {
///     calls += 1;
///     if calls < 3 {
///         Err(io::Error::new(io::ErrorKind::TimedOut, "slow"))
///     } else {
///         Ok("done")
///     }
/// })?;
///
/// assert_eq!(value, "done");
/// assert_eq!(retry.attempts(), 3);
/// assert_eq!(retry.retry_count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Retry<T, E> {
    pub(crate) max_retries: u32,
    pub(crate) catchable: Vec<ErrorMatcher<E>>,
    pub(crate) short_circuit: bool,
    pub(crate) backoff: Option<Arc<dyn BackoffStrategy>>,
    pub(crate) on_result: Option<Hook<T, E>>,
    pub(crate) on_error: Option<Hook<T, E>>,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) subscribers: SubscriberSet,
    pub(crate) stats: RunStats,
}

impl<T, E> Retry<T, E> {
    /// Starts a configuration.
    pub fn builder() -> RetryBuilder<T, E> {
        RetryBuilder::new()
    }

    /// Starts a configuration seeded from plain settings.
    pub fn from_config(cfg: &RetryConfig) -> RetryBuilder<T, E> {
        RetryBuilder::from_config(cfg)
    }

    // ---- Introspection (last work function of the last run) ----

    /// Statistics of the most recent work function.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Total attempts made, resets included.
    pub fn attempts(&self) -> u32 {
        self.stats.attempts()
    }

    /// Attempts beyond the first one.
    pub fn retry_count(&self) -> u32 {
        self.stats.retries()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn is_short_circuit(&self) -> bool {
        self.short_circuit
    }

    pub fn has_backoff_strategy(&self) -> bool {
        self.backoff.is_some()
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.stats.last_error()
    }

    pub fn total_backoff(&self) -> Duration {
        self.stats.total_backoff()
    }

    pub fn last_backoff(&self) -> Duration {
        self.stats.last_backoff()
    }

    /// Duration of the most recent attempt.
    pub fn elapsed(&self) -> Duration {
        self.stats.elapsed()
    }
}

impl<T, E: fmt::Display> Retry<T, E> {
    /// Runs one work function to a terminal outcome.
    ///
    /// # Errors
    /// - [`RunError::Work`] with the original error when nothing redirected it
    /// - [`RunError::MissingBackoffStrategy`] when a hook asked for a strategy
    ///   backoff without one configured
    pub fn run<F>(&mut self, work: F) -> Result<T, RunError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run_one(0, Box::new(work))
    }

    /// Runs each work function in order, each with fresh statistics.
    ///
    /// The first terminal error aborts the batch.
    pub fn run_all<I, F>(&mut self, works: I) -> Result<Batch<T>, RunError<E>>
    where
        I: IntoIterator<Item = F>,
        F: FnMut() -> Result<T, E>,
    {
        let mut results = Vec::new();
        for (index, work) in works.into_iter().enumerate() {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            results.push(self.run_one(index, Box::new(work))?);
        }
        if results.len() == 1 {
            if let Some(only) = results.pop() {
                return Ok(Batch::One(only));
            }
        }
        Ok(Batch::Many(results))
    }

    fn run_one<'w>(&mut self, index: u32, work: Work<'w, T, E>) -> Result<T, RunError<E>> {
        let mut stats = RunStats::new(self.max_retries);
        let res = self.drive(index, work, &mut stats);
        self.stats = stats;
        res
    }

    fn drive<'w>(
        &self,
        index: u32,
        mut work: Work<'w, T, E>,
        stats: &mut RunStats,
    ) -> Result<T, RunError<E>> {
        let mut attempt: u32 = 0;
        let mut waited = Duration::ZERO;

        let outcome = loop {
            stats.attempt = attempt;
            stats.attempts = stats.attempts.saturating_add(1);
            stats.last_backoff = mem::take(&mut waited);
            self.emit(|| {
                Event::new(EventKind::AttemptStarting)
                    .with_work(index)
                    .with_attempt(attempt)
            });

            let started = Instant::now();
            let step = work();
            stats.elapsed = started.elapsed();

            let (signal, outcome) = match step {
                Ok(value) => {
                    stats.last_error = None;
                    self.emit(|| {
                        Event::new(EventKind::AttemptSucceeded)
                            .with_work(index)
                            .with_attempt(attempt)
                            .with_elapsed(stats.elapsed)
                    });
                    match &self.on_result {
                        None => (Signal::Stop, Ok(value)),
                        Some(hook) => {
                            let verdict = hook(&EventContext::with_result(stats, &value));
                            match verdict {
                                Ok(signal) => (signal, Ok(value)),
                                Err(err) => {
                                    let (signal, err) = self.judge_error(index, stats, err);
                                    (signal, Err(err))
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    let (signal, err) = self.judge_error(index, stats, err);
                    (signal, Err(err))
                }
            };

            let last = stats.is_final_attempt();
            match signal {
                Signal::Stop => break outcome,
                Signal::Retry => {}
                Signal::DelayRetry => {
                    if !last {
                        let delay = BackoffPolicy::default().next(attempt);
                        waited = self.pause(index, stats, delay, "delay-retry");
                    }
                }
                // Swallowed on the final attempt, strategy lookup included.
                Signal::Backoff(request) if !last => {
                    let (delay, source) = match request {
                        BackoffRequest::Fixed(d) => (d, "fixed"),
                        BackoffRequest::Strategy => {
                            let Some(strategy) = &self.backoff else {
                                tracing::error!(
                                    attempt,
                                    "backoff requested, but no backoff strategy is configured"
                                );
                                return Err(RunError::MissingBackoffStrategy);
                            };
                            (strategy.compute(attempt), "strategy")
                        }
                    };
                    waited = self.pause(index, stats, delay, source);
                }
                Signal::Backoff(_) => {}
                Signal::Swap(next) => {
                    work = next;
                    tracing::debug!(attempt, "work function swapped");
                }
                Signal::Reset(next) => {
                    let swapped = next.is_some();
                    if let Some(next) = next {
                        work = next;
                    }
                    stats.resets = stats.resets.saturating_add(1);
                    tracing::debug!(attempt, swapped, "attempt counter reset");
                    self.emit(|| {
                        let ev = Event::new(EventKind::CounterReset)
                            .with_work(index)
                            .with_attempt(attempt);
                        if swapped { ev.with_reason("swapped") } else { ev }
                    });
                    attempt = 0;
                    continue;
                }
            }

            if last {
                break outcome;
            }
            attempt += 1;
        };

        match outcome {
            Ok(value) => {
                self.emit(|| {
                    Event::new(EventKind::RunFinished)
                        .with_work(index)
                        .with_attempt(stats.attempt)
                });
                Ok(value)
            }
            Err(err) => {
                self.emit(|| {
                    Event::new(EventKind::RunFailed)
                        .with_work(index)
                        .with_attempt(stats.attempt)
                        .with_reason(err.to_string())
                });
                Err(RunError::Work(err))
            }
        }
    }

    /// Decides what happens to a failed attempt.
    ///
    /// Returns the signal to interpret and the error that now stands as the
    /// attempt's outcome (the error hook may replace it with its own).
    fn judge_error(&self, index: u32, stats: &mut RunStats, err: E) -> (Signal<T, E>, E) {
        let message: Arc<str> = err.to_string().into();
        stats.last_error = Some(message.clone());
        self.emit(|| {
            Event::new(EventKind::AttemptFailed)
                .with_work(index)
                .with_attempt(stats.attempt)
                .with_elapsed(stats.elapsed)
                .with_reason(message.clone())
        });

        if self.suppresses(index, stats, &err, &message) {
            return (Signal::Retry, err);
        }

        let Some(hook) = &self.on_error else {
            return (Signal::Stop, err);
        };
        match hook(&EventContext::with_error(stats, &err)) {
            Ok(signal) => (signal, err),
            Err(replaced) => {
                // The replacement gets the suppression check, not a second hook call.
                let message: Arc<str> = replaced.to_string().into();
                stats.last_error = Some(message.clone());
                if self.suppresses(index, stats, &replaced, &message) {
                    (Signal::Retry, replaced)
                } else {
                    (Signal::Stop, replaced)
                }
            }
        }
    }

    /// `true` when `err` is retried without consulting the error hook.
    fn suppresses(&self, index: u32, stats: &RunStats, err: &E, message: &Arc<str>) -> bool {
        let catchable = self.catchable.iter().any(|matches| matches(err));
        if !catchable || stats.is_final_attempt() || self.short_circuit {
            return false;
        }
        tracing::debug!(
            attempt = stats.attempt,
            max_retries = stats.max_retries,
            error = %message,
            "suppressing catchable error"
        );
        self.emit(|| {
            Event::new(EventKind::ErrorSuppressed)
                .with_work(index)
                .with_attempt(stats.attempt)
                .with_reason(message.clone())
        });
        true
    }

    fn pause(&self, index: u32, stats: &mut RunStats, delay: Duration, source: &'static str) -> Duration {
        stats.total_backoff = stats.total_backoff.saturating_add(delay);
        tracing::debug!(
            attempt = stats.attempt,
            max_retries = stats.max_retries,
            ?delay,
            total = ?stats.total_backoff,
            source,
            "backing off before next attempt"
        );
        self.emit(|| {
            Event::new(EventKind::BackoffScheduled)
                .with_work(index)
                .with_attempt(stats.attempt)
                .with_delay(delay)
                .with_reason(source)
        });
        self.sleeper.sleep(delay);
        delay
    }

    fn emit(&self, build: impl FnOnce() -> Event) {
        if !self.subscribers.is_empty() {
            self.subscribers.emit(&build());
        }
    }
}

impl<T, E> fmt::Debug for Retry<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("max_retries", &self.max_retries)
            .field("catchable", &self.catchable.len())
            .field("short_circuit", &self.short_circuit)
            .field("backoff", &self.backoff.is_some())
            .field("on_result", &self.on_result.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("subscribers", &self.subscribers)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DefaultBackoff, Subscribe,
        core::sleeper::{InstantSleeper, TrackingSleeper},
    };
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum Flaky {
        #[error("transient: {0}")]
        Transient(&'static str),
        #[error("fatal: {0}")]
        Fatal(&'static str),
    }

    fn is_transient(e: &Flaky) -> bool {
        matches!(e, Flaky::Transient(_))
    }

    fn builder<T>() -> RetryBuilder<T, Flaky> {
        Retry::builder().sleeper(InstantSleeper)
    }

    #[test]
    fn test_plain_value_single_attempt() {
        let mut retry = builder().build().unwrap();
        assert_eq!(retry.run(|| Ok(5)).unwrap(), 5);
        assert_eq!(retry.attempts(), 1);
        assert_eq!(retry.retry_count(), 0);
    }

    #[test]
    fn test_accepting_hook_single_attempt() {
        let mut retry = builder()
            .retries(5)
            .on_result(|ctx| Ok(ctx.accept()))
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok("Dog")).unwrap(), "Dog");
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn test_always_retry_exhausts_budget_and_returns_last_value() {
        let mut calls = 0;
        let mut retry = builder()
            .retries(3)
            .on_result(|ctx| Ok(ctx.retry()))
            .build()
            .unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                Ok(calls)
            })
            .unwrap();
        assert_eq!(value, 4);
        assert_eq!(calls, 4);
        assert_eq!(retry.retry_count(), 3);
        assert_eq!(retry.stats().attempt(), 3);
    }

    #[test]
    fn test_unhandled_error_propagates_verbatim() {
        let mut retry = builder::<()>().build().unwrap();
        let err = retry
            .run(|| Err(Flaky::Fatal("this should get thrown")))
            .unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Fatal("this should get thrown")));
    }

    #[test]
    fn test_catchable_error_retried_then_rethrown() {
        let mut calls = 0;
        let mut retry = builder::<()>().retries(4).catch(is_transient).build().unwrap();
        let err = retry
            .run(|| {
                calls += 1;
                Err(Flaky::Transient("this should get thrown"))
            })
            .unwrap_err();
        assert!(matches!(err, RunError::Work(Flaky::Transient("this should get thrown"))));
        assert_eq!(calls, 5);
        assert_eq!(retry.retry_count(), 4);
        assert_eq!(retry.last_error(), Some("transient: this should get thrown"));
    }

    #[test]
    fn test_non_matching_error_ignores_budget() {
        let mut calls = 0;
        let mut retry = builder::<()>().retries(3).catch(is_transient).build().unwrap();
        let err = retry
            .run(|| {
                calls += 1;
                Err(Flaky::Fatal("nope"))
            })
            .unwrap_err();
        assert_eq!(err.work(), Some(&Flaky::Fatal("nope")));
        assert_eq!(calls, 1);
        assert_eq!(retry.retry_count(), 0);
    }

    #[test]
    fn test_catchable_error_recovers() {
        let mut calls = 0;
        let mut retry = builder().retries(2).catch_all().build().unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                if calls < 3 { Err(Flaky::Transient("flap")) } else { Ok("up") }
            })
            .unwrap();
        assert_eq!(value, "up");
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn test_short_circuit_bypasses_suppression() {
        let mut calls = 0;
        let mut retry = builder::<()>()
            .retries(5)
            .catch_all()
            .short_circuit()
            .build()
            .unwrap();
        assert!(retry
            .run(|| {
                calls += 1;
                Err(Flaky::Transient("x"))
            })
            .is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_result_hook_error_propagates() {
        let mut retry = builder::<u32>()
            .on_result(|_ctx| Err(Flaky::Fatal("Result Handler called")))
            .build()
            .unwrap();
        let err = retry.run(|| Ok(5)).unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Fatal("Result Handler called")));
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn test_result_hook_error_goes_through_suppression() {
        let mut calls = 0;
        let mut retry = builder::<u32>()
            .retries(2)
            .catch(is_transient)
            .on_result(|ctx| match ctx.result() {
                Some(n) if *n < 3 => Err(Flaky::Transient("not ready")),
                _ => Ok(ctx.accept()),
            })
            .build()
            .unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                Ok(calls)
            })
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn test_error_hook_can_redirect_terminal_error() {
        let mut calls = 0;
        let mut retry = builder()
            .retries(2)
            .on_error(|ctx| {
                assert!(ctx.error().is_some());
                Ok(ctx.retry())
            })
            .build()
            .unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                if calls < 3 { Err(Flaky::Fatal("down")) } else { Ok("recovered") }
            })
            .unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn test_error_hook_retry_on_final_attempt_ends_run() {
        let mut retry = builder::<()>()
            .retries(1)
            .on_error(|ctx| Ok(ctx.retry()))
            .build()
            .unwrap();
        let err = retry.run(|| Err(Flaky::Fatal("down"))).unwrap_err();
        assert!(err.is_work());
        assert_eq!(retry.attempts(), 2);
    }

    #[test]
    fn test_error_hook_not_consulted_while_suppressing() {
        let consulted = Arc::new(Mutex::new(Vec::new()));
        let log = consulted.clone();
        let mut retry = builder::<()>()
            .retries(2)
            .catch_all()
            .on_error(move |ctx| {
                log.lock().unwrap().push(ctx.attempt());
                Ok(ctx.fail())
            })
            .build()
            .unwrap();
        assert!(retry.run(|| Err(Flaky::Transient("x"))).is_err());
        assert_eq!(*consulted.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_error_hook_replacement_error_is_terminal() {
        let mut retry = builder::<()>()
            .retries(3)
            .on_error(|_ctx| Err(Flaky::Fatal("hook gave up")))
            .build()
            .unwrap();
        let err = retry.run(|| Err(Flaky::Transient("x"))).unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Fatal("hook gave up")));
        assert_eq!(retry.attempts(), 1);
        assert_eq!(retry.last_error(), Some("fatal: hook gave up"));
    }

    #[test]
    fn test_static_backoff_skips_final_wait() {
        let sleeper = Arc::new(TrackingSleeper::new());
        let mut retry = Retry::<&str, Flaky>::builder()
            .retries(3)
            .sleeper(sleeper.clone())
            .on_result(|ctx| Ok(ctx.static_backoff(Duration::from_secs(2))))
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok("Boosh")).unwrap(), "Boosh");
        assert_eq!(retry.attempts(), 4);
        assert_eq!(retry.total_backoff(), Duration::from_secs(6));
        assert_eq!(retry.last_backoff(), Duration::from_secs(2));
        assert_eq!(sleeper.calls(), vec![Duration::from_secs(2); 3]);
    }

    #[test]
    fn test_strategy_backoff_accumulates_on_strategy() {
        let strategy = Arc::new(DefaultBackoff::fixed(Duration::from_secs(2)));
        let mut retry = builder()
            .retries(3)
            .backoff_strategy(strategy.clone())
            .on_result(|ctx| {
                if ctx.is_final_attempt() { Ok(ctx.accept()) } else { Ok(ctx.backoff()) }
            })
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok("Boosh")).unwrap(), "Boosh");
        assert_eq!(retry.retry_count(), 3);
        assert_eq!(strategy.total(), Duration::from_secs(6));
        assert_eq!(retry.total_backoff(), Duration::from_secs(6));
    }

    #[test]
    fn test_missing_strategy_is_fatal() {
        let mut retry = builder::<u8>()
            .retries(2)
            .on_result(|ctx| Ok(ctx.backoff()))
            .build()
            .unwrap();
        let err = retry.run(|| Ok(1)).unwrap_err();
        assert!(matches!(err, RunError::MissingBackoffStrategy));
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn test_delay_retry_uses_exponential_schedule() {
        let sleeper = Arc::new(TrackingSleeper::new());
        let mut retry = Retry::<u8, Flaky>::builder()
            .retries(2)
            .sleeper(sleeper.clone())
            .on_result(|ctx| Ok(ctx.delay_retry()))
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok(9)).unwrap(), 9);

        let calls = sleeper.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0] >= Duration::from_secs(1) && calls[0] <= Duration::from_secs(2));
        assert!(calls[1] >= Duration::from_secs(2) && calls[1] <= Duration::from_secs(3));
        assert_eq!(retry.total_backoff(), sleeper.total());
    }

    #[test]
    fn test_reset_restarts_counter_and_keeps_total() {
        let mut retry = builder()
            .retries(1)
            .on_result(|ctx| {
                if ctx.attempts() < 4 && ctx.is_final_attempt() {
                    Ok(ctx.reset())
                } else if ctx.attempts() < 4 {
                    Ok(ctx.retry())
                } else {
                    Ok(ctx.accept())
                }
            })
            .build()
            .unwrap();
        retry.run(|| Ok(())).unwrap();
        assert_eq!(retry.attempts(), 4);
        assert_eq!(retry.stats().resets(), 1);
        assert_eq!(retry.stats().attempt(), 1);
        assert_eq!(retry.max_retries(), 1);
    }

    #[test]
    fn test_reset_and_run_swaps_work() {
        let mut retry = builder::<u32>()
            .on_result(|ctx| match ctx.result() {
                Some(1) => Ok(ctx.reset_and_run(|| Ok(2))),
                _ => Ok(ctx.accept()),
            })
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok(1)).unwrap(), 2);
        assert_eq!(retry.attempts(), 2);
        assert_eq!(retry.stats().resets(), 1);
    }

    #[test]
    fn test_run_all_collects_in_order() {
        let mut retry = builder().build().unwrap();
        let works: Vec<Box<dyn FnMut() -> Result<&'static str, Flaky>>> =
            vec![Box::new(|| Ok("five")), Box::new(|| Ok("Pineapple"))];
        let batch = retry.run_all(works).unwrap();
        assert_eq!(batch, Batch::Many(vec!["five", "Pineapple"]));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_run_all_single_is_unwrapped() {
        let mut retry = builder().build().unwrap();
        let batch = retry.run_all([|| Ok::<_, Flaky>(5)]).unwrap();
        assert_eq!(batch, Batch::One(5));
        assert_eq!(batch.into_one(), Some(5));
    }

    #[test]
    fn test_run_all_empty() {
        let mut retry = builder::<u8>().build().unwrap();
        let works: Vec<fn() -> Result<u8, Flaky>> = Vec::new();
        let batch = retry.run_all(works).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_run_all_stops_at_first_terminal_error() {
        let mut third_ran = false;
        let mut retry = builder::<u8>().build().unwrap();
        let works: Vec<Box<dyn FnMut() -> Result<u8, Flaky> + '_>> = vec![
            Box::new(|| Ok(1)),
            Box::new(|| Err(Flaky::Fatal("second"))),
            Box::new(|| {
                third_ran = true;
                Ok(3)
            }),
        ];
        let err = retry.run_all(works).unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Fatal("second")));
        assert!(!third_ran);
    }

    #[test]
    fn test_each_work_gets_fresh_stats() {
        let mut retry = builder()
            .retries(2)
            .on_result(|ctx| Ok(ctx.retry()))
            .build()
            .unwrap();
        let works: Vec<Box<dyn FnMut() -> Result<u8, Flaky>>> =
            vec![Box::new(|| Ok(1)), Box::new(|| Ok(2))];
        let batch = retry.run_all(works).unwrap();
        assert_eq!(batch.into_vec(), vec![1, 2]);
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn test_engine_is_reusable() {
        let mut retry = builder::<u8>().retries(1).catch_all().build().unwrap();
        assert!(retry.run(|| Err(Flaky::Transient("a"))).is_err());
        assert_eq!(retry.attempts(), 2);
        assert_eq!(retry.run(|| Ok(1)).unwrap(), 1);
        assert_eq!(retry.attempts(), 1);
        assert!(retry.last_error().is_none());
    }

    #[test]
    fn test_error_hook_catchable_replacement_is_retried() {
        let mut calls = 0;
        let mut retry = builder()
            .retries(3)
            .catch(is_transient)
            .on_error(|ctx| match ctx.error() {
                Some(Flaky::Fatal(_)) => Err(Flaky::Transient("downgraded")),
                _ => Ok(ctx.fail()),
            })
            .build()
            .unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                if calls == 1 { Err(Flaky::Fatal("boom")) } else { Ok(9) }
            })
            .unwrap();
        assert_eq!(value, 9);
        assert_eq!(retry.attempts(), 2);
    }

    #[test]
    fn test_error_hook_catchable_replacement_on_final_attempt_is_terminal() {
        let mut retry = builder::<u8>()
            .catch(is_transient)
            .on_error(|_ctx| Err(Flaky::Transient("downgraded")))
            .build()
            .unwrap();
        let err = retry.run(|| Err(Flaky::Fatal("boom"))).unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Transient("downgraded")));
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn test_short_circuit_still_consults_error_hook() {
        let mut calls = 0;
        let mut retry = builder()
            .retries(2)
            .catch_all()
            .short_circuit()
            .on_error(|ctx| Ok(ctx.retry()))
            .build()
            .unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                if calls == 1 { Err(Flaky::Transient("blip")) } else { Ok("up") }
            })
            .unwrap();
        assert_eq!(value, "up");
        assert_eq!(retry.attempts(), 2);
    }

    #[test]
    fn test_short_circuit_does_not_suppress_hook_replacement() {
        let mut retry = builder::<u8>()
            .retries(2)
            .catch_all()
            .short_circuit()
            .on_error(|_ctx| Err(Flaky::Transient("replaced")))
            .build()
            .unwrap();
        let err = retry.run(|| Err(Flaky::Fatal("boom"))).unwrap_err();
        assert_eq!(err.into_work(), Some(Flaky::Transient("replaced")));
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn test_missing_strategy_swallowed_on_final_attempt() {
        let mut retry = builder::<u8>()
            .on_result(|ctx| Ok(ctx.backoff()))
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok(1)).unwrap(), 1);
        assert_eq!(retry.attempts(), 1);
        assert_eq!(retry.total_backoff(), Duration::ZERO);
    }

    #[test]
    fn test_success_clears_last_error() {
        let mut calls = 0;
        let mut retry = builder().retries(1).catch_all().build().unwrap();
        let value = retry
            .run(|| {
                calls += 1;
                if calls == 1 { Err(Flaky::Transient("blip")) } else { Ok(7) }
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(retry.attempts(), 2);
        assert!(retry.last_error().is_none());
    }

    #[test]
    fn test_swap_work_keeps_budget() {
        let mut retry = builder::<u32>()
            .retries(2)
            .on_result(|ctx| match ctx.result() {
                Some(1) => Ok(ctx.swap_work(|| Ok(2))),
                _ => Ok(ctx.accept()),
            })
            .build()
            .unwrap();
        assert_eq!(retry.run(|| Ok(1)).unwrap(), 2);
        assert_eq!(retry.attempts(), 2);
        assert_eq!(retry.stats().attempt(), 1);
        assert_eq!(retry.stats().resets(), 0);
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<EventKind>>);

    impl Subscribe for Collect {
        fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn test_events_follow_the_loop() {
        let events = Arc::new(Collect::default());
        let mut calls = 0;
        let mut retry = builder()
            .retries(2)
            .catch_all()
            .with_subscribers(vec![events.clone() as Arc<dyn Subscribe>])
            .build()
            .unwrap();
        retry
            .run(|| {
                calls += 1;
                if calls == 1 { Err(Flaky::Transient("blip")) } else { Ok(()) }
            })
            .unwrap();

        assert_eq!(
            *events.0.lock().unwrap(),
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptFailed,
                EventKind::ErrorSuppressed,
                EventKind::AttemptStarting,
                EventKind::AttemptSucceeded,
                EventKind::RunFinished,
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_always_retry_runs_budget_plus_one(n in 0u32..64) {
            let mut calls = 0u32;
            let mut retry = builder()
                .retries(n)
                .on_result(|ctx| Ok(ctx.retry()))
                .build()
                .unwrap();
            let value = retry.run(|| { calls += 1; Ok(calls) }).unwrap();
            prop_assert_eq!(calls, n + 1);
            prop_assert_eq!(value, n + 1);
            prop_assert_eq!(retry.retry_count(), n);
        }

        #[test]
        fn prop_static_backoff_totals_d_times_r(r in 0u32..16, ms in 0u64..5_000) {
            let d = Duration::from_millis(ms);
            let mut retry = builder()
                .retries(r)
                .on_result(move |ctx| Ok(ctx.static_backoff(d)))
                .build()
                .unwrap();
            retry.run(|| Ok(())).unwrap();
            prop_assert_eq!(retry.total_backoff(), d * r);
        }
    }
}
