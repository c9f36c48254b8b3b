//! Worker Pool Implementation
//!
//! Spawns a fixed number of workers, each blocking on the task queue.
//!
//! ## Responsibilities
//! - **Claiming**: moving the task's record Pending -> Processing before any work starts.
//! - **Execution**: calling the text service under a timeout, inside its own tokio task
//!   so that a panic is caught as a `JoinError` instead of killing the worker.
//! - **Finalizing**: recording Success/Failed and acknowledging the message.

use super::protocol::{MessageError, TaskMessage, TaskRequest};
use super::queue::{Delivery, DeliveryTag, QueueError, TaskQueue};
use super::types::*;
use crate::storage::result_store::{ResultStore, StoreError};
use crate::text::client::{TextService, TextServiceError};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of concurrent workers. Fixed for the executor's lifetime.
    pub worker_count: usize,
    /// Upper bound on one text-service call. Expiry fails the task.
    pub task_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            task_timeout: Duration::from_secs(60),
        }
    }
}

/// The engine that drives task execution.
pub struct TaskExecutor {
    queue: Arc<dyn TaskQueue>,
    store: Arc<dyn ResultStore>,
    text_service: Arc<dyn TextService>,
    config: ExecutorConfig,
}

impl TaskExecutor {
    pub fn new(
        queue: Arc<dyn TaskQueue>,
        store: Arc<dyn ResultStore>,
        text_service: Arc<dyn TextService>,
        config: ExecutorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            store,
            text_service,
            config,
        })
    }

    /// Requeues deliveries left unacknowledged by a previous run, then spawns the
    /// workers and returns their handles immediately.
    pub async fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        match self.queue.requeue_unacked().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("Recovered {} unacknowledged tasks", n),
            Err(e) => tracing::warn!("Failed to recover unacknowledged tasks: {}", e),
        }

        let handles = (0..self.config.worker_count)
            .map(|worker_id| {
                let executor = self.clone();
                tokio::spawn(async move {
                    executor.worker_loop(worker_id).await;
                })
            })
            .collect();

        tracing::info!(
            "Task executor started with {} workers",
            self.config.worker_count
        );
        handles
    }

    async fn worker_loop(&self, worker_id: usize) {
        tracing::info!("Worker {} started", worker_id);

        loop {
            let delivery = match self.queue.dequeue().await {
                Ok(delivery) => delivery,
                Err(QueueError::Closed) => {
                    tracing::info!("Worker {} stopping: queue closed", worker_id);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Worker {} failed to dequeue: {}", worker_id, e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };

            self.handle_delivery(worker_id, delivery).await;
        }
    }

    /// Processes one message end to end. Never returns an error: every failure is
    /// either recorded on the task or logged.
    pub(crate) async fn handle_delivery(&self, worker_id: usize, delivery: Delivery) {
        let request = match TaskMessage::decode(&delivery.body) {
            Ok(request) => request,
            Err(e) => {
                self.reject_message(delivery.tag, e).await;
                return;
            }
        };

        match self
            .store
            .apply(&request.id, TaskTransition::BeginProcessing)
            .await
        {
            Ok(_) => {
                tracing::info!(
                    "Worker {} claimed task {} ({})",
                    worker_id,
                    request.id,
                    request.kind
                );
            }
            Err(StoreError::Transition { source, .. }) => {
                tracing::debug!(
                    "Task {} already {:?}, dropping redelivered message",
                    request.id,
                    source.from
                );
                self.ack(delivery.tag).await;
                return;
            }
            Err(StoreError::NotFound(id)) => {
                tracing::warn!("No record for task {}, discarding message", id);
                self.ack(delivery.tag).await;
                return;
            }
            Err(e) => {
                // Left unacknowledged so the message can be redelivered.
                tracing::error!(
                    "Worker {} failed to claim task {}: {}",
                    worker_id,
                    request.id,
                    e
                );
                return;
            }
        }

        let outcome = self.run_task(&request).await;

        match self
            .store
            .apply(&request.id, TaskTransition::Finish(outcome))
            .await
        {
            Ok(record) => {
                match record.state {
                    TaskState::Success => tracing::info!("Task {} completed", record.id),
                    _ => tracing::warn!(
                        "Task {} failed: {}",
                        record.id,
                        record.error.as_deref().unwrap_or_default()
                    ),
                }
                self.ack(delivery.tag).await;
            }
            Err(e) => {
                tracing::error!("Failed to record outcome of task {}: {}", request.id, e);
            }
        }
    }

    /// Calls the text service for one task and folds every way it can go wrong
    /// into a `TaskOutcome`.
    async fn run_task(&self, request: &TaskRequest) -> TaskOutcome {
        let service = self.text_service.clone();
        let kind = request.kind;
        let input = request.input.clone();

        let mut handle = tokio::spawn(async move { service.transform(kind, &input).await });

        match tokio::time::timeout(self.config.task_timeout, &mut handle).await {
            Ok(Ok(Ok(text))) if text.trim().is_empty() => {
                TaskOutcome::Failed(TextServiceError::EmptyOutput.to_string())
            }
            Ok(Ok(Ok(text))) => TaskOutcome::Succeeded(text),
            Ok(Ok(Err(e))) => TaskOutcome::Failed(e.to_string()),
            Ok(Err(join_error)) if join_error.is_panic() => {
                let payload = join_error.into_panic();
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Text service panicked on task {}: {}", request.id, reason);
                TaskOutcome::Failed(format!("text service panicked: {}", reason))
            }
            Ok(Err(join_error)) => {
                TaskOutcome::Failed(format!("text service call aborted: {}", join_error))
            }
            Err(_) => {
                handle.abort();
                TaskOutcome::Failed(
                    TextServiceError::Timeout(self.config.task_timeout).to_string(),
                )
            }
        }
    }

    /// Discards a message this worker cannot execute. It is acknowledged, not retried.
    /// When the message still names a task, that task is failed so polling terminates.
    async fn reject_message(&self, tag: DeliveryTag, error: MessageError) {
        tracing::error!("Discarding message {}: {}", tag, error);

        if let MessageError::UnknownKind { id, source } = &error {
            let failed = match self.store.apply(id, TaskTransition::BeginProcessing).await {
                Ok(_) => {
                    self.store
                        .apply(
                            id,
                            TaskTransition::Finish(TaskOutcome::Failed(source.to_string())),
                        )
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = failed {
                tracing::warn!("Could not fail task {} after rejecting its message: {}", id, e);
            }
        }

        self.ack(tag).await;
    }

    async fn ack(&self, tag: DeliveryTag) {
        if let Err(e) = self.queue.ack(tag).await {
            tracing::warn!("Failed to acknowledge message {}: {}", tag, e);
        }
    }
}
