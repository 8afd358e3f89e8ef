//! # Lifecycle events emitted by the retry engine.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one execution of the work function (starting, succeeded, failed)
//! - **Control events**: what the engine decided (suppressed, backoff, reset)
//! - **Terminal events**: how the run for one work function ended
//!
//! The [`Event`] struct carries the metadata: timestamp, attempt index, the
//! position of the work function inside a batch, reasons and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_work(0)
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.attempt, Some(2));
//! assert_eq!(ev.delay_ms, Some(4_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Attempt events ===
    /// The work function is about to be invoked.
    ///
    /// Sets:
    /// - `work`: position in the batch
    /// - `attempt`: 0-based attempt index
    AttemptStarting,

    /// The work function returned a value.
    ///
    /// Sets:
    /// - `work`, `attempt`
    /// - `elapsed_ms`: duration of the attempt
    AttemptSucceeded,

    /// The work function (or a hook) returned an error.
    ///
    /// Sets:
    /// - `work`, `attempt`, `elapsed_ms`
    /// - `reason`: error message
    AttemptFailed,

    // === Control events ===
    /// The error matched a catchable kind and the next attempt follows.
    ///
    /// Sets:
    /// - `work`, `attempt`
    /// - `reason`: error message
    ErrorSuppressed,

    /// The engine is about to sleep before the next attempt.
    ///
    /// Sets:
    /// - `work`, `attempt`
    /// - `delay_ms`: how long
    /// - `reason`: `"delay-retry"`, `"strategy"` or `"fixed"`
    BackoffScheduled,

    /// A hook reset the attempt counter.
    ///
    /// Sets:
    /// - `work`, `attempt` (index before the reset)
    /// - `reason`: `"swapped"` when a replacement work function was installed
    CounterReset,

    // === Terminal events ===
    /// The run for one work function produced a value.
    ///
    /// Sets:
    /// - `work`, `attempt` (final index)
    RunFinished,

    /// The run for one work function ended with an error.
    ///
    /// Sets:
    /// - `work`, `attempt` (final index)
    /// - `reason`: error message
    RunFailed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: `subscriber=<name> info=<panic message>`
    SubscriberPanicked,
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Position of the work function inside the submitted batch.
    pub work: Option<u32>,
    /// 0-based attempt index.
    pub attempt: Option<u32>,
    /// Backoff delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Attempt duration in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Human-readable reason (errors, backoff source, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            work: None,
            attempt: None,
            delay_ms: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches the batch position of the work function.
    #[inline]
    pub fn with_work(mut self, index: u32) -> Self {
        self.work = Some(index);
        self
    }

    /// Attaches an attempt index.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an attempt duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
