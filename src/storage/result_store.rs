use crate::executor::types::{TaskId, TaskRecord, TaskState, TaskTransition, TransitionError};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("task {0} already exists")]
    AlreadyExists(TaskId),

    #[error("task {id}: {source}")]
    Transition {
        id: TaskId,
        #[source]
        source: TransitionError,
    },

    #[error("result backend unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Per-state record counts, used by the stats reporter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: usize,
    pub processing: usize,
    pub success: usize,
    pub failed: usize,
}

impl StateCounts {
    pub fn record(&mut self, state: TaskState) {
        match state {
            TaskState::Pending => self.pending += 1,
            TaskState::Processing => self.processing += 1,
            TaskState::Success => self.success += 1,
            TaskState::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.processing + self.success + self.failed
    }
}

/// Map from task id to the task's current record.
///
/// The single source of truth for status queries. Every method is atomic per key:
/// a concurrent `get` observes either the record before an `apply` or after it.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Creates a record. Fails if the id is already taken.
    async fn insert(&self, record: TaskRecord) -> Result<(), StoreError>;

    async fn get(&self, id: &TaskId) -> Result<TaskRecord, StoreError>;

    /// Runs one state-machine transition against the stored record and returns the result.
    async fn apply(&self, id: &TaskId, transition: TaskTransition)
    -> Result<TaskRecord, StoreError>;

    /// Drops a record that was never dispatched.
    async fn remove(&self, id: &TaskId) -> Result<(), StoreError>;

    async fn counts(&self) -> Result<StateCounts, StoreError>;
}
