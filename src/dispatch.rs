//! # Status-code dispatch.
//!
//! [`StatusRouter`] turns "one handler per status code" into a result hook. The
//! work function returns any value implementing [`HasStatus`] (an HTTP response,
//! an RPC reply, a process exit code); the router looks up the handler registered
//! for that code and lets it pick the signal. Codes without a handler are accepted.
//!
//! ```text
//! work() ─► response ─► router ─┬─ handler(503)  ─► ctx.static_backoff(..)
//!                               ├─ handler(429)  ─► ctx.exponential_backoff()
//!                               └─ (no handler)  ─► ctx.accept()
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use retryvisor::{HasStatus, InstantSleeper, Retry, StatusRouter};
//!
//! struct Reply { code: u16 }
//!
//! impl HasStatus for Reply {
//!     fn status(&self) -> u16 { self.code }
//! }
//!
//! let router = StatusRouter::<Reply, String>::new()
//!     .on_many([502, 503], |ctx| Ok(ctx.static_backoff(Duration::from_millis(10))))
//!     .on(409, |ctx| Ok(ctx.retry()));
//!
//! let mut codes = vec![503, 409, 200].into_iter();
//! let mut retry = Retry::builder()
//!     .retries(5)
//!     .sleeper(InstantSleeper)
//!     .on_status(router)
//!     .build()?;
//!
//! let reply = retry.run(|| Ok(Reply { code: codes.next().unwrap_or(200) }))?;
//! assert_eq!(reply.code, 200);
//! assert_eq!(retry.attempts(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    core::{EventContext, Hook, HookResult},
    error::ConfigError,
};

/// A result that carries a status code.
pub trait HasStatus {
    /// The status code used to pick a handler.
    fn status(&self) -> u16;
}

type Handler<R, E> = Arc<dyn Fn(&EventContext<'_, R, E>) -> HookResult<R, E> + Send + Sync>;

/// Handlers keyed by status code.
///
/// Registering the same code twice is a [`ConfigError::DuplicateStatusHandler`],
/// reported when the router is installed and the engine built.
pub struct StatusRouter<R, E> {
    handlers: HashMap<u16, Handler<R, E>>,
    error: Option<ConfigError>,
}

impl<R, E> Default for StatusRouter<R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E> StatusRouter<R, E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            error: None,
        }
    }

    /// Handles one status code.
    pub fn on<F>(self, status: u16, handler: F) -> Self
    where
        F: Fn(&EventContext<'_, R, E>) -> HookResult<R, E> + Send + Sync + 'static,
    {
        self.on_many([status], handler)
    }

    /// Handles several status codes with the same handler.
    pub fn on_many<I, F>(mut self, statuses: I, handler: F) -> Self
    where
        I: IntoIterator<Item = u16>,
        F: Fn(&EventContext<'_, R, E>) -> HookResult<R, E> + Send + Sync + 'static,
    {
        let handler: Handler<R, E> = Arc::new(handler);
        for status in statuses {
            if self.handlers.contains_key(&status) {
                self.error
                    .get_or_insert(ConfigError::DuplicateStatusHandler { status });
                continue;
            }
            self.handlers.insert(status, Arc::clone(&handler));
        }
        self
    }

    /// `true` when a handler is registered for `status`.
    pub fn handles(&self, status: u16) -> bool {
        self.handlers.contains_key(&status)
    }
}

impl<R: HasStatus + 'static, E: 'static> StatusRouter<R, E> {
    /// Converts the router into a result hook.
    pub fn into_hook(self) -> Result<Hook<R, E>, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let handlers = self.handlers;
        Ok(boxed(move |ctx: &EventContext<'_, R, E>| {
            let Some(result) = ctx.result() else {
                return Ok(ctx.accept());
            };
            let status = result.status();
            match handlers.get(&status) {
                Some(handler) => handler(ctx),
                None => {
                    tracing::debug!(status, "no status handler registered; accepting result");
                    Ok(ctx.accept())
                }
            }
        }))
    }
}

fn boxed<R, E, F>(hook: F) -> Hook<R, E>
where
    F: Fn(&EventContext<'_, R, E>) -> HookResult<R, E> + Send + Sync + 'static,
{
    Box::new(hook)
}
