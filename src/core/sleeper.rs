//! # Blocking pause between attempts.
//!
//! The engine never sleeps directly; it goes through a [`Sleeper`] so tests and
//! embedders can observe or skip the waits.
//!
//! - [`ThreadSleeper`]   blocks the calling thread (default)
//! - [`InstantSleeper`]  returns immediately
//! - [`TrackingSleeper`] returns immediately and records every requested delay

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pauses the calling flow.
pub trait Sleeper: Send + Sync {
    /// Blocks for `delay`.
    fn sleep(&self, delay: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, delay: Duration) {
        (**self).sleep(delay)
    }
}

/// `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Never waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _delay: Duration) {}
}

/// Never waits; remembers what it was asked to do.
///
/// ```rust
/// use std::time::Duration;
/// use retryvisor::{Sleeper, TrackingSleeper};
///
/// let sleeper = TrackingSleeper::new();
/// sleeper.sleep(Duration::from_secs(2));
/// sleeper.sleep(Duration::from_secs(3));
/// assert_eq!(sleeper.calls().len(), 2);
/// assert_eq!(sleeper.total(), Duration::from_secs(5));
/// ```
#[derive(Debug, Default)]
pub struct TrackingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Sum of every requested delay.
    pub fn total(&self) -> Duration {
        self.calls().iter().sum()
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, delay: Duration) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(delay);
    }
}
