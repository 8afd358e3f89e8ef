//! # Event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`], which hands every engine event to each registered
//! subscriber in turn.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► subscriber1.on_event()
//!     │        └──► panic → SubscriberPanicked (to the others)
//!     ├──► subscriber2.on_event()
//!     └──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - **Synchronous**: `emit()` returns once every subscriber has seen the event
//! - **Registration order**: subscriber A always sees event N before B does
//! - **Isolation**: a panicking subscriber doesn't abort the run or skip the others
//!
//! ## Panic handling
//! Each call is wrapped in `catch_unwind`:
//! - the panic is converted to a `SubscriberPanicked` event for the other subscribers
//! - a `SubscriberPanicked` event is never re-reported, so a subscriber that panics on
//!   everything cannot loop
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Ordered collection of subscribers.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subscribers }
    }

    /// `true` when nobody listens; the engine skips building events then.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers an event to all subscribers.
    pub fn emit(&self, event: &Event) {
        for (idx, sub) in self.subscribers.iter().enumerate() {
            let res = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(event)));
            if let Err(panic_err) = res {
                let info = panic_message(&*panic_err);
                tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");
                if !event.is_subscriber_panic() {
                    self.report_panic(idx, Event::subscriber_panicked(sub.name(), info));
                }
            }
        }
    }

    fn report_panic(&self, culprit: usize, event: Event) {
        for (idx, sub) in self.subscribers.iter().enumerate() {
            if idx == culprit {
                continue;
            }
            let _ = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(&event)));
        }
    }
}

fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.subscribers.iter().map(|s| s.name()).collect();
        f.debug_struct("SubscriberSet")
            .field("subscribers", &names)
            .finish()
    }
}
