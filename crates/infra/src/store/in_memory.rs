//! In-memory task store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use rota_core::{TaskId, TaskRecord};

use super::r#trait::{TaskStore, TaskStoreError};

/// In-memory task store.
///
/// Single-process only: it coordinates workers within one process the same
/// way the durable store coordinates replicas, which is exactly what the
/// scheduler's tests need.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of the record for `id`, if one has been persisted.
    pub fn get(&self, id: &TaskId) -> Option<TaskRecord> {
        self.records.read().unwrap().get(id).cloned()
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskStore for InMemoryTaskStore {
    fn fetch_or_init(&self, id: &TaskId) -> Result<TaskRecord, TaskStoreError> {
        let records = self.records.read().unwrap();
        Ok(records
            .get(id)
            .cloned()
            .unwrap_or_else(|| TaskRecord::new(id.clone(), Utc::now())))
    }

    fn save(&self, record: &TaskRecord) -> Result<(), TaskStoreError> {
        let mut records = self.records.write().unwrap();
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }
}
