//! Per-task circuit breaker.

use crate::policy::CIRCUIT_BREAK_THRESHOLD;

/// Consecutive-failure tally for one task's worker.
///
/// Each worker owns its breaker outright; there is no process-wide
/// failure map to synchronize. The count covers failed cycles of any kind
/// (claim errors as well as execution errors) and resets only when an
/// execution succeeds. Tripping is one-way: once the threshold is
/// exceeded the worker exits and only a process restart brings the task
/// back.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    failures: u32,
    threshold: u32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: 0,
            threshold,
        }
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    /// True once the consecutive-failure count has exceeded the threshold.
    pub fn tripped(&self) -> bool {
        self.failures > self.threshold
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CIRCUIT_BREAK_THRESHOLD)
    }
}
