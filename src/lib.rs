//! # retryvisor
//!
//! **Retryvisor** is a synchronous retry engine for Rust.
//!
//! It runs a fallible work function repeatedly under a retry budget. After every
//! attempt a user hook inspects the outcome and answers with a [`Signal`]: accept
//! it, retry now, retry after a pause, or reset the budget (optionally swapping in
//! new work). Errors of designated kinds are retried automatically.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    work #1   │   │    work #2   │   │    work #3   │
//!     │ FnMut() -> R │   │ FnMut() -> R │   │ FnMut() -> R │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼ (in order, fresh RunStats each)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Retry (attempt loop)                                             │
//! │  - catchable matchers + short_circuit (automatic suppression)     │
//! │  - on_result / on_error hooks (return Signal)                     │
//! │  - BackoffStrategy (ctx.backoff())                                │
//! │  - Sleeper (blocking pause)                                       │
//! │  - SubscriberSet (synchronous event fan-out)                      │
//! └──────┬───────────────────────────────────────────────────┬────────┘
//!        ▼                                                   ▼
//!   EventContext ──► hook ──► Signal                      Event
//!   (stats, result | error)   Stop / Retry / DelayRetry   AttemptStarting
//!                             Backoff / Swap / Reset      AttemptFailed
//!                                                         BackoffScheduled
//!                                                         RunFinished ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! Retry::builder() ──► RetryBuilder::build() ──► Retry::run(work)
//!
//! loop {
//!   ├─► attempts += 1, publish AttemptStarting
//!   ├─► work()
//!   │     ├─ Ok(v)  ──► on_result(ctx) ──► Signal   (no hook: Stop)
//!   │     └─ Err(e) ──► catchable && retries left && !short_circuit
//!   │                     ├─ yes ─► Retry
//!   │                     └─ no  ─► on_error(ctx) ──► Signal   (no hook: Stop)
//!   ├─► Stop        ─► return value / RunError::Work(e)
//!   ├─► Retry       ─► next attempt
//!   ├─► DelayRetry  ─► sleep 2^attempt + U(0,1)s (not after the final attempt)
//!   ├─► Backoff     ─► sleep strategy / fixed delay (not after the final attempt)
//!   ├─► Swap        ─► next attempt runs the new work
//!   └─► Reset       ─► attempt index = 0, maybe new work
//! }
//! budget exhausted ─► last outcome
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Engine**        | Configure and run work under a retry budget.                 | [`Retry`], [`RetryBuilder`], [`Batch`]      |
//! | **Hooks**         | Inspect each attempt and steer the loop.                     | [`EventContext`], [`Signal`], [`Hook`]      |
//! | **Backoff**       | Pluggable wait computation with jitter.                      | [`BackoffStrategy`], [`DefaultBackoff`]     |
//! | **Dispatch**      | One handler per status code, installed as the result hook.   | [`StatusRouter`], [`HasStatus`]             |
//! | **Subscriber API**| Observe the loop (logging, metrics, custom subscribers).     | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed configuration and run errors.                          | [`ConfigError`], [`RunError`]               |
//! | **Configuration** | Plain settings that seed a builder.                          | [`RetryConfig`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use retryvisor::{DefaultBackoff, InstantSleeper, Retry};
//!
//! #[derive(Debug, thiserror::Error)]
//! enum FetchError {
//!     #[error("connection reset")]
//!     Reset,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn retryvisor::Subscribe>> = vec![Arc::new(retryvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn retryvisor::Subscribe>> = Vec::new();
//!
//!     let mut retry = Retry::<String, FetchError>::builder()
//!         .retries(4)
//!         .catch(|e| matches!(e, FetchError::Reset))
//!         .backoff_strategy(DefaultBackoff::fixed(Duration::from_millis(100)))
//!         .on_result(|ctx| match ctx.result() {
//!             Some(body) if body.is_empty() => Ok(ctx.backoff()),
//!             _ => Ok(ctx.accept()),
//!         })
//!         .sleeper(InstantSleeper)
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let mut calls = 0;
//!     let body = retry.run(|| {
//!         calls += 1;
//!         match calls {
//!             1 => Err(FetchError::Reset),
//!             2 => Ok(String::new()),
//!             _ => Ok("payload".to_string()),
//!         }
//!     })?;
//!
//!     assert_eq!(body, "payload");
//!     assert_eq!(retry.attempts(), 3);
//!     assert_eq!(retry.total_backoff(), Duration::from_millis(100));
//!     Ok(())
//! }
//! ```
mod core;
mod dispatch;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    BackoffRequest, Batch, ErrorMatcher, EventContext, Hook, HookResult, InstantSleeper,
    Invokable, Retry, RetryBuilder, RetryConfig, RunStats, Signal, Sleeper, ThreadSleeper,
    TrackingSleeper,
};
pub use dispatch::{HasStatus, StatusRouter};
pub use error::{ConfigError, RunError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, BackoffStrategy, DefaultBackoff, JitterPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
