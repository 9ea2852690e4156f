//! Scheduling policy: backoff and jitter.

use std::time::Duration;

/// Floor for every interval the scheduler sleeps, and the interval every
/// worker starts from.
pub const MIN_INTERVAL: Duration = Duration::from_secs(60);

/// Consecutive failures a task may accumulate before its worker is
/// permanently stopped. The trip happens on the failure *exceeding* this.
pub const CIRCUIT_BREAK_THRESHOLD: u32 = 10;

/// Next retry interval after a failure.
///
/// Below the floor the result is exactly the floor; at or above it the
/// interval doubles. Growth is unbounded (saturating), so a persistently
/// failing task retries ever more rarely until the circuit breaker ends it.
pub fn backoff(interval: Duration) -> Duration {
    if interval < MIN_INTERVAL {
        MIN_INTERVAL
    } else {
        interval.saturating_mul(2)
    }
}

/// Additive uniform jitter: a value in `[base, 2 * base)`.
///
/// Applied to the executor-chosen interval after a successful cycle so that
/// replicas which happen to be in phase drift apart instead of claiming the
/// same window forever.
pub fn jittered(base: Duration) -> Duration {
    base.saturating_add(base.mul_f64(rand::random::<f64>()))
}
