//! # Event subscribers for the retry engine.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and,
//! behind the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Retry::run ── emit(Event) ──► SubscriberSet
//!                                      │
//!                                 ┌────┴────┬─────────┬───────┐
//!                                 ▼         ▼         ▼       ▼
//!                             LogWriter  Metrics   Custom    ...
//! ```

mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
mod log;

pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
