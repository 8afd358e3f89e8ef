//! Backoff and jitter policies.
//!
//! This module groups the knobs that control **how long** the engine waits
//! before the next attempt when a hook asks it to back off.
//!
//! ## Contents
//! - [`BackoffPolicy`]   how delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]    randomization applied on top of the base delay
//! - [`BackoffStrategy`] the seam the engine calls for strategy-driven backoff
//! - [`DefaultBackoff`]  policy-backed strategy that totals what it produced
//!
//! ## Quick wiring
//! ```text
//! RetryBuilder::backoff_strategy(DefaultBackoff)
//!      └─► core::engine::Retry uses:
//!           - strategy.compute(attempt) on Signal::Backoff(BackoffRequest::Strategy)
//!           - BackoffPolicy::default().next(attempt) on Signal::DelayRetry
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=1h, jitter=Additive(1s).
//! - `JitterPolicy::None` by default.

mod backoff;
mod jitter;

pub use backoff::{BackoffPolicy, BackoffStrategy, DefaultBackoff};
pub use jitter::JitterPolicy;
