//! Exponential-backoff retry.
//!
//! A small, lock-agnostic primitive: run a fallible operation, and on failure
//! sleep for a geometrically growing interval before trying again, until the
//! operation succeeds or the deadline passes.
//!
//! # Schedule
//!
//! - The first attempt always runs, whatever the deadline.
//! - Intervals start at `initial_interval` and grow by `multiplier` after each
//!   failure, capped at `max_interval`.
//! - Each sleep is clamped to the time left before the deadline, so the final
//!   attempt lands at (or just after) the deadline rather than past it.
//! - `max_attempts`, when set, stops the loop early.
//! - With [`expo_if`], an error the caller marks as final stops the loop at
//!   once.
//! - Intervals never drop below [`MIN_INTERVAL`], even for a zero policy.

mod backoff;


use std::time::{Duration, Instant};
use tracing::debug;

pub use backoff::{Backoff, MIN_INTERVAL};

/// Parameters for [`expo`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Sleep after the first failed attempt.
    pub initial_interval: Duration,

    /// Total time budget measured from the first attempt.
    pub deadline: Duration,

    /// Growth factor applied to the interval after each failure.
    pub multiplier: f64,

    /// Upper bound on a single sleep.
    pub max_interval: Duration,

    /// Optional bound on the number of attempts.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            deadline: Duration::from_secs(13),
            multiplier: 2.0,
            max_interval: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given initial interval and deadline, defaults elsewhere.
    pub fn new(initial_interval: Duration, deadline: Duration) -> Self {
        Self {
            initial_interval,
            deadline,
            ..Self::default()
        }
    }

    /// The interval schedule for this policy.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_interval, self.multiplier, self.max_interval)
    }
}

/// Returned when retries are exhausted.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Error from the final attempt.
    pub last_error: E,

    /// Number of attempts made.
    pub attempts: u32,

    /// Time from the first attempt until giving up.
    pub elapsed: Duration,
}

/// Retry `op` under `policy`, blocking the current thread between attempts.
pub fn expo<T, E, F>(policy: &RetryPolicy, op: F) -> Result<T, Exhausted<E>>
where
    F: FnMut() -> Result<T, E>,
{
    expo_with(policy, op, std::thread::sleep)
}

/// Like [`expo`], with the sleep function supplied by the caller.
pub fn expo_with<T, E, F, S>(policy: &RetryPolicy, op: F, sleep: S) -> Result<T, Exhausted<E>>
where
    F: FnMut() -> Result<T, E>,
    S: FnMut(Duration),
{
    expo_if_with(policy, |_| true, op, sleep)
}

/// Like [`expo`], but gives up as soon as `retryable` rejects an error.
pub fn expo_if<T, E, R, F>(policy: &RetryPolicy, retryable: R, op: F) -> Result<T, Exhausted<E>>
where
    R: FnMut(&E) -> bool,
    F: FnMut() -> Result<T, E>,
{
    expo_if_with(policy, retryable, op, std::thread::sleep)
}

/// Like [`expo_if`], with the sleep function supplied by the caller.
pub fn expo_if_with<T, E, R, F, S>(
    policy: &RetryPolicy,
    mut retryable: R,
    mut op: F,
    mut sleep: S,
) -> Result<T, Exhausted<E>>
where
    R: FnMut(&E) -> bool,
    F: FnMut() -> Result<T, E>,
    S: FnMut(Duration),
{
    let start = Instant::now();
    let mut schedule = policy.backoff();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);

        let last_error = match op() {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let elapsed = start.elapsed();
        let out_of_attempts = policy.max_attempts.is_some_and(|max| attempts >= max);
        if out_of_attempts || elapsed >= policy.deadline || !retryable(&last_error) {
            return Err(Exhausted {
                last_error,
                attempts,
                elapsed,
            });
        }

        let remaining = policy.deadline - elapsed;
        let wait = schedule.next_interval().min(remaining);
        debug!(attempt = attempts, wait = ?wait, "backing off before retry");
        sleep(wait);
    }
}
