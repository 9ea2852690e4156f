//! The persisted coordination record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::TaskId;

/// Coordination row for one recurring task, shared by all replicas through
/// the durable store.
///
/// The record carries no replica identity or lease token: scheduling is
/// *advisory*. A replica claims a window by observing `last_execution_at`
/// and writing its own timestamp back; nothing fences two replicas whose
/// reads interleave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,

    /// Opaque serialized state from the last persisted execution.
    /// Empty until a first execution has run.
    pub state: String,

    /// When the task was last claimed for execution. `None` means never.
    pub last_execution_at: Option<DateTime<Utc>>,

    /// When the record was first initialized. Preserved across saves.
    pub created_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Initialize a fresh, not-yet-persisted record for `id`.
    pub fn new(id: TaskId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            state: String::new(),
            last_execution_at: None,
            created_at: now,
        }
    }

    /// Whether the task's window is open at `now` for the given interval.
    ///
    /// A never-run task is always due. Otherwise the window opens exactly
    /// at `last_execution_at + interval`; before that point another replica
    /// owns the window.
    pub fn is_due(&self, interval: Duration, now: DateTime<Utc>) -> bool {
        let Some(last) = self.last_execution_at else {
            return true;
        };
        match chrono::Duration::from_std(interval)
            .ok()
            .and_then(|d| last.checked_add_signed(d))
        {
            Some(next) => next <= now,
            // Interval too large to represent: the window never reopens.
            None => false,
        }
    }

    /// Record a claim: stamp `last_execution_at` with the claim time.
    pub fn mark_claimed(&mut self, now: DateTime<Utc>) {
        self.last_execution_at = Some(now);
    }
}
