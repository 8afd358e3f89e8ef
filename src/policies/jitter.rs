//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that callers sharing a
//! flaky dependency do not hammer it in lockstep.
//!
//! - [`JitterPolicy::None`] no randomization, predictable delays
//! - [`JitterPolicy::Full`] random delay in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + random[0, delay/2]`
//! - [`JitterPolicy::Additive`] `delay + random[0, spread]` (the default engine flavour)

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
///
/// ## Trade-offs
/// - **None**: predictable, but synchronized retries
/// - **Full**: maximum spread, may shrink the delay to zero
/// - **Equal**: keeps at least half of the computed delay
/// - **Additive**: never shorter than the computed delay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in `[0, delay]`.
    Full,

    /// Equal jitter: `delay/2 + random[0, delay/2]`.
    Equal,

    /// Additive jitter: `delay + random[0, spread]`.
    ///
    /// With `spread = 1s` this reproduces the classic
    /// `2^attempt + uniform(0, 1)` seconds schedule.
    Additive {
        /// Upper bound of the random amount added on top of the delay.
        spread: Duration,
    },
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => full_jitter(delay),
            JitterPolicy::Equal => equal_jitter(delay),
            JitterPolicy::Additive { spread } => additive_jitter(delay, *spread),
        }
    }
}

/// Full jitter: random[0, delay]
fn full_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

/// Equal jitter: delay/2 + random[0, delay/2]
fn equal_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rand::rng().random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}

/// Additive jitter: delay + random[0, spread]
fn additive_jitter(delay: Duration, spread: Duration) -> Duration {
    let ms = spread.as_millis() as u64;
    if ms == 0 {
        return delay;
    }
    let extra = Duration::from_millis(rand::rng().random_range(0..=ms));
    delay.saturating_add(extra)
}
