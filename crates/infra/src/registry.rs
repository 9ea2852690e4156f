//! Task registry: the closed set of schedulable tasks and their launcher.

use std::collections::HashMap;
use std::thread;

use thiserror::Error;
use tracing::debug;

use rota_core::{TaskExecutor, TaskId};

use crate::runner::{TaskWorker, WorkerConfig};
use crate::store::TaskStore;

type ExecutorFactory = Box<dyn Fn() -> Box<dyn TaskExecutor> + Send + Sync>;

/// Launch-time error. Nothing else ever propagates out of the scheduler:
/// once workers run, failures stay inside their worker.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
}

/// Registry of executor factories keyed by task identifier.
///
/// The set of tasks a deployment runs is closed and known at startup.
/// Each factory is invoked once per launch; the produced executor is asked
/// `enabled()` a single time, and a disabled task starts nothing at all:
/// no worker, no failure counter, no store access.
#[derive(Default)]
pub struct TaskRegistry {
    factories: HashMap<TaskId, ExecutorFactory>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `id`, replacing any previous entry.
    pub fn register<F, E>(&mut self, id: impl Into<TaskId>, factory: F)
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: TaskExecutor + 'static,
    {
        self.factories
            .insert(id.into(), Box::new(move || Box::new(factory())));
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.factories.contains_key(id)
    }

    /// Launch the worker for one task on a detached, named thread and
    /// return immediately.
    ///
    /// There is deliberately no handle to join or cancel: a worker stops
    /// only when its circuit breaker trips or the process exits.
    pub fn spawn<S>(&self, id: &TaskId, store: S, config: &WorkerConfig) -> Result<(), RegistryError>
    where
        S: TaskStore + 'static,
    {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| RegistryError::UnknownTask(id.clone()))?;

        let executor = factory();
        if !executor.enabled() {
            debug!(task = %id, "task is not enabled, skipping");
            return Ok(());
        }

        let worker = TaskWorker::new(id.clone(), executor, store, config);
        thread::Builder::new()
            .name(format!("task-{id}"))
            .spawn(move || worker.run())
            .expect("failed to spawn task worker thread");

        Ok(())
    }

    /// Start every registered task's loop and return without blocking.
    pub fn spawn_all<S>(&self, store: S, config: &WorkerConfig) -> Result<(), RegistryError>
    where
        S: TaskStore + Clone + 'static,
    {
        for id in self.factories.keys() {
            self.spawn(id, store.clone(), config)?;
        }
        Ok(())
    }
}
