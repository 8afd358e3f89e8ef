//! Engine events.
//!
//! This module holds the event **data model** published by the retry loop to the
//! [`SubscriberSet`](crate::SubscriberSet) of a [`Retry`](crate::Retry).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: `core::engine::Retry` (one event per attempt/decision),
//!   `SubscriberSet` itself (subscriber panics).
//! - **Consumers**: user [`Subscribe`](crate::Subscribe) implementations, the
//!   optional `LogWriter`.

mod event;

pub use event::{Event, EventKind};
