//! Durable task store boundary.
//!
//! The store is the coordination medium between replicas: a single row per
//! task, fetched and saved by key. This module defines the contract without
//! storage assumptions, plus the in-memory (tests/dev) and Postgres
//! (production) implementations.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryTaskStore;
pub use postgres::PostgresTaskStore;
pub use r#trait::{TaskStore, TaskStoreError};
