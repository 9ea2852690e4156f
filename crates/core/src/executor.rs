//! The pluggable unit of task-specific work.

use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::error::TaskError;

/// Outcome of one execution of a task's unit of work.
///
/// Both variants carry the new state: the scheduler persists result state
/// regardless of whether the work succeeded, so a failing executor can
/// still checkpoint partial progress (or return its prior state).
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// The unit of work succeeded. `next_interval` is the base interval
    /// the scheduler should wait before the next attempt (jitter is added
    /// on top by the worker).
    Completed {
        next_interval: Duration,
        state: JsonValue,
    },

    /// The unit of work failed. The interval choice is taken away from the
    /// executor for this cycle: the worker applies backoff instead.
    Failed { error: TaskError, state: JsonValue },
}

impl Execution {
    pub fn completed(next_interval: Duration, state: JsonValue) -> Self {
        Self::Completed {
            next_interval,
            state,
        }
    }

    pub fn failed(error: TaskError, state: JsonValue) -> Self {
        Self::Failed { error, state }
    }

    /// The state to persist, independent of outcome.
    pub fn state(&self) -> &JsonValue {
        match self {
            Execution::Completed { state, .. } => state,
            Execution::Failed { state, .. } => state,
        }
    }
}

/// A recurring background task's implementation.
///
/// This is the extension point of the scheduler: implementations own the
/// business logic and the schema of their opaque state, nothing else.
/// `execute` must be safe to invoke repeatedly and after arbitrary elapsed
/// time: replicas come and go, and the previous run may have happened on
/// another process.
pub trait TaskExecutor: Send {
    /// Whether this task should run at all in the current deployment.
    /// Queried once at launch; a disabled task starts no worker.
    fn enabled(&self) -> bool;

    /// Perform one unit of work given the last persisted state
    /// (empty string on first run).
    fn execute(&mut self, prior_state: &str) -> Execution;
}
