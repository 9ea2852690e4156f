//! Task store contract.

use std::sync::Arc;

use thiserror::Error;

use rota_core::{TaskId, TaskRecord};

/// Task store operation error.
///
/// These are infrastructure errors; a worker reacts to any of them with
/// backoff, never by stopping (short of the circuit breaker).
#[derive(Debug, Error, Clone)]
pub enum TaskStoreError {
    /// The underlying storage failed (I/O, connection, constraint).
    #[error("storage error: {0}")]
    Storage(String),

    /// The store was driven from a context it cannot block in.
    #[error("runtime misuse: {0}")]
    Runtime(String),
}

/// Single-row, key-addressed store for task coordination records.
///
/// Only two operations are required of the storage engine:
///
/// - `fetch_or_init`: return the stored record for `id`, or a freshly
///   initialized record when no row exists yet. The fresh record is *not*
///   persisted by this call; the first `save` creates the row (whichever
///   replica claims the first run wins the insert).
/// - `save`: upsert the record by its id, preserving `created_at` for an
///   existing row.
///
/// No transaction or locking primitives are assumed beyond single-row
/// read/write: coordination is advisory, by timestamp observation.
pub trait TaskStore: Send + Sync {
    fn fetch_or_init(&self, id: &TaskId) -> Result<TaskRecord, TaskStoreError>;

    fn save(&self, record: &TaskRecord) -> Result<(), TaskStoreError>;
}

impl<S> TaskStore for Arc<S>
where
    S: TaskStore + ?Sized,
{
    fn fetch_or_init(&self, id: &TaskId) -> Result<TaskRecord, TaskStoreError> {
        (**self).fetch_or_init(id)
    }

    fn save(&self, record: &TaskRecord) -> Result<(), TaskStoreError> {
        (**self).save(record)
    }
}
