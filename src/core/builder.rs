//! # Engine builder.
//!
//! [`RetryBuilder`] collects the retry budget, catchable matchers, hooks, backoff
//! strategy, sleeper and subscribers, then freezes them into a [`Retry`].
//! Misuse is recorded as it happens and surfaces from [`RetryBuilder::build`].

use std::sync::Arc;

use crate::{
    core::{
        config::RetryConfig,
        engine::{ErrorMatcher, Retry},
        signal::{Hook, HookResult},
        sleeper::{Sleeper, ThreadSleeper},
        stats::RunStats,
    },
    dispatch::{HasStatus, StatusRouter},
    error::ConfigError,
    policies::{BackoffStrategy, DefaultBackoff},
    subscribers::{Subscribe, SubscriberSet},
    EventContext,
};

/// Builder for a [`Retry`] engine.
///
/// Every setter returns the builder for chaining. Misuse (a second hook, a second
/// strategy) is remembered and reported by [`build`](Self::build); the first
/// problem wins.
pub struct RetryBuilder<T, E> {
    max_retries: u32,
    catchable: Vec<ErrorMatcher<E>>,
    short_circuit: bool,
    backoff: Option<Arc<dyn BackoffStrategy>>,
    on_result: Option<Hook<T, E>>,
    on_error: Option<Hook<T, E>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    error: Option<ConfigError>,
}

impl<T, E> Default for RetryBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> RetryBuilder<T, E> {
    /// Single attempt, nothing catchable, no hooks.
    pub fn new() -> Self {
        Self {
            max_retries: 0,
            catchable: Vec::new(),
            short_circuit: false,
            backoff: None,
            on_result: None,
            on_error: None,
            sleeper: None,
            subscribers: Vec::new(),
            error: None,
        }
    }

    /// Seeds the builder from plain settings.
    pub fn from_config(cfg: &RetryConfig) -> Self {
        let mut builder = Self::new().retries(cfg.max_retries);
        if cfg.short_circuit {
            builder = builder.short_circuit();
        }
        if let Some(policy) = cfg.backoff {
            builder = builder.backoff_strategy(DefaultBackoff::with_policy(policy));
        }
        builder
    }

    /// Attempts allowed after the first one.
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Marks errors accepted by `matcher` as catchable (retried automatically).
    ///
    /// Matchers accumulate; an error is catchable if any of them accepts it.
    pub fn catch<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.catchable.push(Box::new(matcher));
        self
    }

    /// Marks every error as catchable.
    pub fn catch_all(self) -> Self {
        self.catch(|_| true)
    }

    /// Every error becomes terminal on first sight.
    pub fn short_circuit(mut self) -> Self {
        self.short_circuit = true;
        self
    }

    /// Registers the strategy consulted by `ctx.backoff()`.
    pub fn backoff_strategy<S>(mut self, strategy: S) -> Self
    where
        S: BackoffStrategy + 'static,
    {
        if self.backoff.is_some() {
            self.record(ConfigError::DuplicateBackoffStrategy);
        } else {
            self.backoff = Some(Arc::new(strategy));
        }
        self
    }

    /// Registers the hook called after every successful attempt.
    ///
    /// Without one, the first value is accepted.
    pub fn on_result<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EventContext<'_, T, E>) -> HookResult<T, E> + Send + Sync + 'static,
    {
        self.set_result_hook(Box::new(hook));
        self
    }

    /// Registers the hook called when an error is about to become terminal.
    ///
    /// Catchable errors with retries left are retried without consulting it.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&EventContext<'_, T, E>) -> HookResult<T, E> + Send + Sync + 'static,
    {
        if self.on_error.is_some() {
            self.record(ConfigError::DuplicateErrorHook);
        } else {
            self.on_error = Some(Box::new(hook));
        }
        self
    }

    /// Replaces the blocking sleeper (defaults to [`ThreadSleeper`]).
    pub fn sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Some(Arc::new(sleeper));
        self
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the engine, or reports the first configuration mistake.
    pub fn build(self) -> Result<Retry<T, E>, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Retry {
            max_retries: self.max_retries,
            catchable: self.catchable,
            short_circuit: self.short_circuit,
            backoff: self.backoff,
            on_result: self.on_result,
            on_error: self.on_error,
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(ThreadSleeper)),
            subscribers: SubscriberSet::new(self.subscribers),
            stats: RunStats::new(self.max_retries),
        })
    }

    fn set_result_hook(&mut self, hook: Hook<T, E>) {
        if self.on_result.is_some() {
            self.record(ConfigError::DuplicateResultHook);
        } else {
            self.on_result = Some(hook);
        }
    }

    fn record(&mut self, err: ConfigError) {
        self.error.get_or_insert(err);
    }
}

impl<T: HasStatus + 'static, E: 'static> RetryBuilder<T, E> {
    /// Installs a [`StatusRouter`] as the result hook.
    ///
    /// Counts as the result hook: combining it with [`on_result`](Self::on_result)
    /// is a [`ConfigError::DuplicateResultHook`].
    pub fn on_status(mut self, router: StatusRouter<T, E>) -> Self {
        match router.into_hook() {
            Ok(hook) => self.set_result_hook(hook),
            Err(err) => self.record(err),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    type Builder = RetryBuilder<u32, String>;

    #[test]
    fn test_duplicate_result_hook() {
        let err = Builder::new()
            .on_result(|ctx| Ok(ctx.accept()))
            .on_result(|ctx| Ok(ctx.retry()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateResultHook);
    }

    #[test]
    fn test_duplicate_error_hook() {
        let err = Builder::new()
            .on_error(|ctx| Ok(ctx.fail()))
            .on_error(|ctx| Ok(ctx.fail()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateErrorHook);
    }

    #[test]
    fn test_duplicate_backoff_strategy() {
        let err = Builder::new()
            .backoff_strategy(DefaultBackoff::new())
            .backoff_strategy(DefaultBackoff::fixed(Duration::from_secs(1)))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateBackoffStrategy);
    }

    #[test]
    fn test_first_error_wins() {
        let err = Builder::new()
            .on_error(|ctx| Ok(ctx.fail()))
            .on_error(|ctx| Ok(ctx.fail()))
            .on_result(|ctx| Ok(ctx.accept()))
            .on_result(|ctx| Ok(ctx.accept()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateErrorHook);
    }

    #[test]
    fn test_from_config() {
        let cfg = RetryConfig {
            max_retries: 4,
            short_circuit: true,
            backoff: Some(crate::BackoffPolicy::constant(Duration::from_millis(10))),
        };
        let retry = Builder::from_config(&cfg).build().unwrap();
        assert_eq!(retry.max_retries(), 4);
        assert!(retry.is_short_circuit());
        assert!(retry.has_backoff_strategy());
    }

    #[test]
    fn test_from_config_then_strategy_is_duplicate() {
        let cfg = RetryConfig {
            backoff: Some(crate::BackoffPolicy::default()),
            ..RetryConfig::default()
        };
        let err = Builder::from_config(&cfg)
            .backoff_strategy(DefaultBackoff::new())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateBackoffStrategy);
    }
}
