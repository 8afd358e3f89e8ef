//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! engine. Subscribers are called inline, on the thread that runs the retry loop,
//! in registration order.
//!
//! ## Contract
//! - Implementations should be quick: the next attempt does not start until every
//!   subscriber has returned.
//! - A panicking subscriber is isolated by the [`SubscriberSet`](crate::SubscriberSet);
//!   the run continues.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use retryvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicU32);
//!
//! impl Subscribe for FailureCounter {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::AttemptFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use crate::events::Event;

/// Contract for event subscribers.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
