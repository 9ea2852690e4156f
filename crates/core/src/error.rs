//! Task-level error model.

use thiserror::Error;

/// Failure reported by (or on behalf of) a task execution.
///
/// Keep this focused on the outcome of a single unit of work. Storage
/// failures belong to the store layer, launch failures to the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The executor's unit of work failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The executor aborted with an unexpected runtime fault (panic),
    /// caught at the worker boundary.
    #[error("runtime fault: {0}")]
    Fault(String),
}

impl TaskError {
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}
