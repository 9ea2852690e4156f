//! Per-task scheduler worker.
//!
//! One worker owns one task: its executor, its current interval, and its
//! circuit breaker. The worker repeats a sleep/claim/execute/persist cycle
//! forever, coordinating with other replicas only through the task record
//! in the shared store.
//!
//! ## Claim discipline
//!
//! The claim is advisory: fetch the record, check whether the window has
//! reopened, stamp `last_execution_at`, save, then execute. Two replicas
//! whose reads interleave before either save can both run the same window;
//! the scheduler promises *approximately* one execution per interval
//! across a fleet, not mutual exclusion. Jitter after every successful
//! cycle keeps replicas from staying in phase.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use rota_core::{
    CIRCUIT_BREAK_THRESHOLD, CircuitBreaker, Execution, MIN_INTERVAL, TaskError, TaskExecutor,
    TaskId, backoff, jittered,
};

use crate::store::TaskStore;

/// Static configuration for task workers.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Interval every worker starts from; also the backoff floor origin.
    pub initial_interval: Duration,

    /// Consecutive failures a task may accumulate before its worker is
    /// permanently stopped.
    pub failure_threshold: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            initial_interval: MIN_INTERVAL,
            failure_threshold: CIRCUIT_BREAK_THRESHOLD,
        }
    }
}

/// Outcome of one scheduler cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The unit of work ran and succeeded. (The result-state save may
    /// still have failed; that is logged only.)
    Completed,

    /// Another replica owns the current window; nothing ran and nothing
    /// was mutated.
    Skipped,

    /// The cycle failed (claim error, execution error, or a caught
    /// runtime fault). Backoff was applied and the failure counted.
    Failed,

    /// The circuit breaker tripped. The worker must stop for good; only a
    /// process restart brings the task back.
    Tripped,
}

/// Scheduler worker for a single task.
pub struct TaskWorker<S> {
    id: TaskId,
    executor: Box<dyn TaskExecutor>,
    store: S,
    interval: Duration,
    breaker: CircuitBreaker,
}

impl<S: TaskStore> TaskWorker<S> {
    pub fn new(
        id: TaskId,
        executor: Box<dyn TaskExecutor>,
        store: S,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            id,
            executor,
            store,
            interval: config.initial_interval,
            breaker: CircuitBreaker::new(config.failure_threshold),
        }
    }

    /// The wait before the next cycle (already backed off or jittered).
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consecutive failures accumulated so far.
    pub fn failures(&self) -> u32 {
        self.breaker.failures()
    }

    /// Drive the worker until the circuit breaker trips: sleep the
    /// current interval, run one cycle, repeat.
    pub fn run(mut self) {
        info!(task = %self.id, "task worker started");
        loop {
            thread::sleep(self.interval);
            if self.run_cycle() == CycleOutcome::Tripped {
                break;
            }
        }
        info!(task = %self.id, "task worker stopped");
    }

    /// One pass of the claim → execute → persist state machine.
    ///
    /// Public so hosts and tests can drive cycles without threads or
    /// sleeping.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        // Claim: fetch or initialize the coordination record.
        let mut record = match self.store.fetch_or_init(&self.id) {
            Ok(record) => record,
            Err(error) => return self.retry_later("finding last execution failed", &error),
        };

        // Eligibility: if the window has not reopened yet, another replica
        // already claimed it. No mutation, no counting.
        let now = Utc::now();
        if !record.is_due(self.interval, now) {
            return CycleOutcome::Skipped;
        }

        // Stamp the claim before executing so other replicas observe the
        // window as taken while the work is still running.
        record.mark_claimed(now);
        if let Err(error) = self.store.save(&record) {
            return self.retry_later("saving execution time failed", &error);
        }

        debug!(task = %self.id, "starting task execution");
        let executor = self.executor.as_mut();
        let execution = match panic::catch_unwind(AssertUnwindSafe(|| {
            executor.execute(&record.state)
        })) {
            Ok(execution) => execution,
            Err(payload) => {
                // A fault leaves no result state to persist; it only
                // counts and backs off, like any execution failure.
                let fault = TaskError::fault(panic_message(payload.as_ref()));
                return self.retry_later("task execution fault", &fault);
            }
        };

        let succeeded = match &execution {
            Execution::Completed { .. } => {
                self.breaker.record_success();
                true
            }
            Execution::Failed { error, .. } => {
                self.breaker.record_failure();
                self.interval = backoff(self.interval);
                warn!(
                    task = %self.id,
                    error = %error,
                    retry_in = ?self.interval,
                    "task execution failed"
                );
                false
            }
        };

        // Result state is persisted regardless of outcome. A failure here
        // is logged only: it touches neither the counter nor the interval.
        let state_saved = match serde_json::to_string(execution.state()) {
            Ok(state) => {
                record.state = state;
                match self.store.save(&record) {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(task = %self.id, error = %error, "failed to save task state");
                        false
                    }
                }
            }
            Err(error) => {
                warn!(task = %self.id, error = %error, "failed to serialize task state");
                false
            }
        };

        if self.breaker.tripped() {
            error!(
                task = %self.id,
                failures = self.breaker.failures(),
                "task terminated by circuit breaker"
            );
            return CycleOutcome::Tripped;
        }

        // Only a fully successful cycle lets the executor set the pace;
        // jitter desynchronizes replicas that happen to be in phase.
        if succeeded && state_saved {
            if let Execution::Completed { next_interval, .. } = &execution {
                self.interval = jittered(*next_interval);
                debug!(task = %self.id, waiting = ?self.interval, "task execution finished");
            }
        }

        if succeeded {
            CycleOutcome::Completed
        } else {
            CycleOutcome::Failed
        }
    }

    /// Shared failure path for everything that prevented an execution:
    /// back off, count it, and stop the worker once the breaker trips.
    fn retry_later(
        &mut self,
        message: &'static str,
        error: &dyn std::error::Error,
    ) -> CycleOutcome {
        self.breaker.record_failure();
        self.interval = backoff(self.interval);
        warn!(
            task = %self.id,
            error = %error,
            retry_in = ?self.interval,
            "{message}"
        );

        if self.breaker.tripped() {
            error!(
                task = %self.id,
                failures = self.breaker.failures(),
                "task terminated by circuit breaker"
            );
            CycleOutcome::Tripped
        } else {
            CycleOutcome::Failed
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
