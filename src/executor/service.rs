//! Submission Gateway & Status Query
//!
//! `TaskService` is the explicitly constructed object that holds the queue and store
//! handles the HTTP layer needs. It turns a validated request into a Pending record plus
//! a queued message, and answers status polls straight from the result store.

use super::protocol::TaskMessage;
use super::queue::TaskQueue;
use super::types::*;
use crate::storage::result_store::{ResultStore, StoreError};

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Empty or missing input. Nothing was created.
    #[error("{0}")]
    Validation(String),

    /// The queue or backend refused the task at submission time. Nothing was created.
    #[error("failed to dispatch task: {0}")]
    Dispatch(String),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handle returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub id: TaskId,
    pub state: TaskState,
}

/// Rejects absent and empty text; returns the text otherwise.
pub fn validate_text(text: Option<String>) -> Result<String, ServiceError> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ServiceError::Validation("text must not be empty".to_string())),
    }
}

pub struct TaskService {
    queue: Arc<dyn TaskQueue>,
    store: Arc<dyn ResultStore>,
}

impl TaskService {
    pub fn new(queue: Arc<dyn TaskQueue>, store: Arc<dyn ResultStore>) -> Arc<Self> {
        Arc::new(Self { queue, store })
    }

    /// Creates a task and queues it for execution without waiting for it to run.
    ///
    /// The Pending record is written before the message is enqueued, so a worker never
    /// sees a message whose record is missing. If the enqueue fails the record is removed
    /// again and the caller gets `Dispatch`.
    pub async fn submit(
        &self,
        kind: TaskKind,
        text: Option<String>,
    ) -> Result<TaskHandle, ServiceError> {
        let input = validate_text(text)?;
        let id = TaskId::new();

        let body = TaskMessage::new(id.clone(), kind, input.clone())
            .encode()
            .map_err(|e| ServiceError::Dispatch(e.to_string()))?;

        self.store
            .insert(TaskRecord::pending(id.clone(), kind, input))
            .await
            .map_err(|e| {
                tracing::error!("Failed to create record for task {}: {}", id, e);
                ServiceError::Dispatch(e.to_string())
            })?;

        if let Err(e) = self.queue.enqueue(body).await {
            tracing::error!("Failed to enqueue task {}: {}", id, e);
            if let Err(rollback) = self.store.remove(&id).await {
                tracing::error!("Failed to roll back record for task {}: {}", id, rollback);
            }
            return Err(ServiceError::Dispatch(e.to_string()));
        }

        tracing::info!("Task submitted: {} ({})", id, kind);
        Ok(TaskHandle {
            id,
            state: TaskState::Pending,
        })
    }

    /// Reads the current record. Never mutates it.
    pub async fn status(&self, id: &TaskId) -> Result<TaskRecord, ServiceError> {
        match self.store.get(id).await {
            Ok(record) => {
                tracing::debug!("Task status query: {} -> {:?}", id, record.state);
                Ok(record)
            }
            Err(StoreError::NotFound(id)) => {
                tracing::debug!("Task not found: {}", id);
                Err(ServiceError::TaskNotFound(id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
