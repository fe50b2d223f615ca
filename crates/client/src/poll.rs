//! Bounded retry primitive for eventually consistent checks.
//!
//! Responsibilities:
//! - Re-invoke a check at a fixed tick until it reports a value or a limit
//!   (wall-clock deadline or attempt count) is reached.
//! - Keep the last "not yet" diagnostic so exhaustion is explainable.
//!
//! Does NOT handle:
//! - Retrying check errors. An `Err` from the check aborts the loop at once.
//! - Cancelling an in-flight check. Only the sleep between checks is bounded.
//!
//! Invariants:
//! - The check runs at least once.
//! - With a deadline `d` and tick `t`, the check runs at most `d / t + 1`
//!   times: another attempt is only scheduled when it would start no later
//!   than the deadline.
//! - Time is measured with `tokio::time`, so paused-clock tests are exact.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Smallest tick accepted by [`PollPolicy`].
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// What bounds a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// Stop once the next attempt would start after this much time.
    Deadline(Duration),
    /// Stop after this many attempts.
    Attempts(u32),
}

/// Tick interval plus limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    tick: Duration,
    limit: PollLimit,
}

impl PollPolicy {
    /// Poll every `tick` until `deadline` has elapsed.
    pub fn deadline(deadline: Duration, tick: Duration) -> Self {
        Self {
            tick: tick.max(MIN_TICK),
            limit: PollLimit::Deadline(deadline),
        }
    }

    /// Poll every `interval`, at most `max_attempts` times (at least once).
    pub fn attempts(max_attempts: u32, interval: Duration) -> Self {
        Self {
            tick: interval.max(MIN_TICK),
            limit: PollLimit::Attempts(max_attempts.max(1)),
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn limit(&self) -> PollLimit {
        self.limit
    }

    fn allows_another(&self, attempts: u32, elapsed: Duration) -> bool {
        match self.limit {
            PollLimit::Deadline(deadline) => elapsed
                .checked_add(self.tick)
                .is_some_and(|next| next <= deadline),
            PollLimit::Attempts(max) => attempts < max,
        }
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The condition holds; polling stops with this value.
    Ready(T),
    /// Not yet; the string describes what was observed.
    Pending(String),
}

/// A successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome<T> {
    pub value: T,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Why a poll did not produce a value.
#[derive(Debug)]
pub enum PollError<E> {
    /// The limit was reached while the check still reported `Pending`.
    Exhausted {
        attempts: u32,
        elapsed: Duration,
        last_diagnostic: String,
    },
    /// The check failed; polling stopped immediately.
    Aborted(E),
}

impl<E> PollError<E> {
    /// Convert the check error type, leaving exhaustion untouched.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> PollError<F> {
        match self {
            Self::Exhausted {
                attempts,
                elapsed,
                last_diagnostic,
            } => PollError::Exhausted {
                attempts,
                elapsed,
                last_diagnostic,
            },
            Self::Aborted(e) => PollError::Aborted(f(e)),
        }
    }
}

impl<E: fmt::Display> fmt::Display for PollError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                attempts,
                elapsed,
                last_diagnostic,
            } => write!(
                f,
                "condition not met after {attempts} attempts in {:.1}s: {last_diagnostic}",
                elapsed.as_secs_f64()
            ),
            Self::Aborted(e) => write!(f, "poll aborted: {e}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for PollError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Exhausted { .. } => None,
            Self::Aborted(e) => Some(e),
        }
    }
}

/// Run `check` under `policy`.
///
/// The check receives the 1-based attempt number and is re-invoked from
/// scratch on every tick, so it should fetch fresh state each time.
pub async fn poll<T, E, F, Fut>(
    policy: &PollPolicy,
    mut check: F,
) -> std::result::Result<PollOutcome<T>, PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<Attempt<T>, E>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let last_diagnostic = match check(attempts).await.map_err(PollError::Aborted)? {
            Attempt::Ready(value) => {
                return Ok(PollOutcome {
                    value,
                    attempts,
                    elapsed: start.elapsed(),
                });
            }
            Attempt::Pending(diagnostic) => diagnostic,
        };

        let elapsed = start.elapsed();
        if !policy.allows_another(attempts, elapsed) {
            debug!(attempts, ?elapsed, %last_diagnostic, "Poll limit reached");
            return Err(PollError::Exhausted {
                attempts,
                elapsed,
                last_diagnostic,
            });
        }

        debug!(attempt = attempts, %last_diagnostic, "Condition pending, retrying");
        tokio::time::sleep(policy.tick).await;
    }
}
