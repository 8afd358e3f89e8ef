//! # Control signals.
//!
//! A [`Signal`] is what a hook hands back to the engine to steer the attempt loop.
//! Signals are plain values, not errors: the work function never sees them and they
//! never leave [`Retry::run`](crate::Retry::run).
//!
//! ```text
//! Stop        ─► current outcome is terminal
//! Retry       ─► next attempt, no wait
//! DelayRetry  ─► wait 2^attempt + U(0,1)s, next attempt
//! Backoff(r)  ─► wait (strategy or fixed), next attempt
//! Swap(w)     ─► next attempt, no wait, running w from now on
//! Reset(w)    ─► attempt index back to 0, optionally with new work
//! ```
//!
//! `DelayRetry` and `Backoff` never wait after the final attempt; the loop just ends.

use std::fmt;
use std::time::Duration;

use crate::core::context::EventContext;

/// Replacement work function installed by [`Signal::Swap`] or [`Signal::Reset`].
pub type Invokable<T, E> = Box<dyn FnMut() -> Result<T, E> + Send + 'static>;

/// What a hook returns: a signal, or an error that becomes the attempt's error.
pub type HookResult<T, E> = Result<Signal<T, E>, E>;

/// Result or error hook registered on a [`RetryBuilder`](crate::RetryBuilder).
pub type Hook<T, E> = Box<dyn Fn(&EventContext<'_, T, E>) -> HookResult<T, E> + Send + Sync>;

/// Where the duration of a [`Signal::Backoff`] comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackoffRequest {
    /// Ask the configured [`BackoffStrategy`](crate::BackoffStrategy).
    Strategy,
    /// Wait exactly this long.
    Fixed(Duration),
}

/// Control value interpreted by the retry loop.
pub enum Signal<T, E> {
    /// Accept the current outcome (value or error) as terminal.
    Stop,
    /// Run the next attempt immediately.
    Retry,
    /// Wait with the default exponential schedule, then retry.
    DelayRetry,
    /// Wait as requested, then retry.
    Backoff(BackoffRequest),
    /// Replace the work function and run the next attempt, budget untouched.
    Swap(Invokable<T, E>),
    /// Restart the attempt budget, optionally swapping the work function.
    Reset(Option<Invokable<T, E>>),
}

impl<T, E> Signal<T, E> {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Signal::Stop => "stop",
            Signal::Retry => "retry",
            Signal::DelayRetry => "delay_retry",
            Signal::Backoff(BackoffRequest::Strategy) => "backoff_strategy",
            Signal::Backoff(BackoffRequest::Fixed(_)) => "backoff_fixed",
            Signal::Swap(_) => "swap",
            Signal::Reset(None) => "reset",
            Signal::Reset(Some(_)) => "reset_and_run",
        }
    }
}

impl<T, E> fmt::Debug for Signal<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Stop => f.write_str("Stop"),
            Signal::Retry => f.write_str("Retry"),
            Signal::DelayRetry => f.write_str("DelayRetry"),
            Signal::Backoff(req) => f.debug_tuple("Backoff").field(req).finish(),
            Signal::Swap(_) => f.write_str("Swap(<work>)"),
            Signal::Reset(next) => f
                .debug_tuple("Reset")
                .field(&next.as_ref().map(|_| "<work>"))
                .finish(),
        }
    }
}

impl<T, E> PartialEq for Signal<T, E> {
    /// Replacement work functions are opaque: two `Swap(_)` or two `Reset(Some(_))` compare equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Backoff(a), Signal::Backoff(b)) => a == b,
            (Signal::Reset(a), Signal::Reset(b)) => a.is_some() == b.is_some(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}
