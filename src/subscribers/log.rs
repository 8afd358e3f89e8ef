//! # LogWriter: tracing-backed event printer
//!
//! A minimal subscriber that forwards incoming [`Event`]s to `tracing`.
//! Install a `tracing` subscriber in the binary to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG retryvisor: [starting] work=0 attempt=0
//!  WARN retryvisor: [failed] work=0 attempt=0 err="connection refused"
//! DEBUG retryvisor: [suppressed] work=0 attempt=0 err="connection refused"
//!  INFO retryvisor: [backoff] work=0 attempt=1 delay_ms=2000 source="strategy"
//! DEBUG retryvisor: [reset] work=0 attempt=3
//!  INFO retryvisor: [finished] work=0 attempt=2
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let work = e.work;
        let attempt = e.attempt;
        let reason = e.reason.as_deref();
        match e.kind {
            EventKind::AttemptStarting => {
                tracing::debug!(?work, ?attempt, "[starting]");
            }
            EventKind::AttemptSucceeded => {
                tracing::debug!(?work, ?attempt, elapsed_ms = ?e.elapsed_ms, "[succeeded]");
            }
            EventKind::AttemptFailed => {
                tracing::warn!(?work, ?attempt, err = ?reason, "[failed]");
            }
            EventKind::ErrorSuppressed => {
                tracing::debug!(?work, ?attempt, err = ?reason, "[suppressed]");
            }
            EventKind::BackoffScheduled => {
                tracing::info!(?work, ?attempt, delay_ms = ?e.delay_ms, source = ?reason, "[backoff]");
            }
            EventKind::CounterReset => {
                tracing::debug!(?work, ?attempt, detail = ?reason, "[reset]");
            }
            EventKind::RunFinished => {
                tracing::info!(?work, ?attempt, "[finished]");
            }
            EventKind::RunFailed => {
                tracing::error!(?work, ?attempt, err = ?reason, "[run-failed]");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(info = ?reason, "[subscriber-panicked]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
