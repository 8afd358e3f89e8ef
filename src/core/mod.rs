//! Engine core: the attempt loop and everything it hands to hooks.
//!
//! The public API from this module is [`Retry`] (built with [`RetryBuilder`]) plus the
//! types a hook touches: [`EventContext`], [`Signal`] and [`RunStats`].
//!
//! Internal modules:
//! - [`engine`]: runs one or many work functions, interprets signals;
//! - [`builder`]: collects configuration and reports misuse at `build()`;
//! - [`config`]: plain settings that seed a builder;
//! - [`context`]: read-only attempt view and signal constructors;
//! - [`signal`]: control values returned by hooks;
//! - [`stats`]: per-run counters and timings;
//! - [`sleeper`]: blocking pause between attempts.

mod builder;
mod config;
mod context;
mod engine;
mod signal;
mod sleeper;
mod stats;

pub use builder::RetryBuilder;
pub use config::RetryConfig;
pub use context::EventContext;
pub use engine::{Batch, ErrorMatcher, Retry};
pub use signal::{BackoffRequest, Hook, HookResult, Invokable, Signal};
pub use sleeper::{InstantSleeper, Sleeper, ThreadSleeper, TrackingSleeper};
pub use stats::RunStats;
