use super::result_store::{ResultStore, StateCounts, StoreError};
use crate::executor::types::{TaskId, TaskRecord, TaskTransition};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// In-memory result backend.
///
/// Records live as long as the process. Updates go through `DashMap::get_mut`, which
/// holds the shard lock for the whole transition, so readers never see a half-written record.
#[derive(Default)]
pub struct MemoryResultStore {
    records: Arc<DashMap<TaskId, TaskRecord>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn insert(&self, record: TaskRecord) -> Result<(), StoreError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(record.id)),
            Entry::Vacant(slot) => {
                tracing::debug!("Stored task {} ({})", record.id, record.kind);
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &TaskId) -> Result<TaskRecord, StoreError> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn apply(
        &self,
        id: &TaskId,
        transition: TaskTransition,
    ) -> Result<TaskRecord, StoreError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        // Work on a copy so a rejected transition leaves the stored record untouched.
        let mut updated = entry.value().clone();
        updated
            .apply(transition)
            .map_err(|source| StoreError::Transition {
                id: id.clone(),
                source,
            })?;

        *entry.value_mut() = updated.clone();
        tracing::trace!("Task {} is now {:?}", id, updated.state);
        Ok(updated)
    }

    async fn remove(&self, id: &TaskId) -> Result<(), StoreError> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn counts(&self) -> Result<StateCounts, StoreError> {
        let mut counts = StateCounts::default();
        for entry in self.records.iter() {
            counts.record(entry.value().state);
        }
        Ok(counts)
    }
}
