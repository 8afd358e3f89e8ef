//! Error types surfaced by the retry engine.
//!
//! This module defines two enums:
//!
//! - [`ConfigError`]: caller misuse detected while building a [`Retry`](crate::Retry).
//! - [`RunError`]: terminal outcome of a run that did not produce a value.
//!
//! Both provide `as_label` for logs/metrics. [`RunError::Work`] carries the
//! original error of the work function untouched, so callers can still match on
//! their own error kinds.

use thiserror::Error;

/// # Errors produced while configuring the engine.
///
/// Every configuration field is write-once; registering a second hook or strategy
/// is recorded by the builder and reported by [`RetryBuilder::build`](crate::RetryBuilder::build).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A result hook (or status router) was already registered.
    #[error("result hook already registered")]
    DuplicateResultHook,

    /// An error hook was already registered.
    #[error("error hook already registered")]
    DuplicateErrorHook,

    /// A backoff strategy was already registered.
    #[error("backoff strategy already registered")]
    DuplicateBackoffStrategy,

    /// Two handlers were registered for the same status code.
    #[error("status handler for {status} already registered")]
    DuplicateStatusHandler {
        /// The conflicting status code.
        status: u16,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::ConfigError;
    ///
    /// let err = ConfigError::DuplicateStatusHandler { status: 503 };
    /// assert_eq!(err.as_label(), "config_duplicate_status_handler");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::DuplicateResultHook => "config_duplicate_result_hook",
            ConfigError::DuplicateErrorHook => "config_duplicate_error_hook",
            ConfigError::DuplicateBackoffStrategy => "config_duplicate_backoff_strategy",
            ConfigError::DuplicateStatusHandler { .. } => "config_duplicate_status_handler",
        }
    }
}

/// # Terminal failures of a run.
///
/// `E` is the error type of the work function.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError<E> {
    /// The work function (or a hook) failed and nothing redirected control.
    ///
    /// The value is the original error, not a wrapper around its message.
    #[error("{0}")]
    Work(E),

    /// A hook asked for a strategy-driven backoff but none was configured.
    #[error("backoff requested, but no backoff strategy is configured")]
    MissingBackoffStrategy,
}

impl<E> RunError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RunError;
    ///
    /// let err: RunError<std::io::Error> = RunError::MissingBackoffStrategy;
    /// assert_eq!(err.as_label(), "run_missing_backoff_strategy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Work(_) => "run_work_failed",
            RunError::MissingBackoffStrategy => "run_missing_backoff_strategy",
        }
    }

    /// `true` when the run ended with the work function's own error.
    pub fn is_work(&self) -> bool {
        matches!(self, RunError::Work(_))
    }

    /// Borrows the work error, if that is what ended the run.
    pub fn work(&self) -> Option<&E> {
        match self {
            RunError::Work(e) => Some(e),
            _ => None,
        }
    }

    /// Takes the work error out, if that is what ended the run.
    ///
    /// # Example
    /// ```
    /// use retryvisor::RunError;
    ///
    /// let err = RunError::Work("boom");
    /// assert_eq!(err.into_work(), Some("boom"));
    /// ```
    pub fn into_work(self) -> Option<E> {
        match self {
            RunError::Work(e) => Some(e),
            _ => None,
        }
    }
}
