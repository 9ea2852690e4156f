//! Infrastructure layer: the durable task store, the per-task worker
//! loop, and the registry that launches workers.

pub mod registry;
pub mod runner;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use registry::{RegistryError, TaskRegistry};
pub use runner::{CycleOutcome, TaskWorker, WorkerConfig};
pub use store::{InMemoryTaskStore, PostgresTaskStore, TaskStore, TaskStoreError};
