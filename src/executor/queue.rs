//! Task Queue
//!
//! The channel carrying task requests from the submission gateway to the worker pool.
//!
//! ## Delivery model
//! - **Enqueue**: returns once the broker has accepted the message. A broker that is
//!   closed, or full for longer than the enqueue timeout, rejects the message.
//! - **Dequeue**: blocks until a message is available. Each message is handed to
//!   exactly one worker and stays *in flight* until that worker acknowledges it.
//! - **Redelivery**: in-flight messages that were never acknowledged (the worker died
//!   between dequeue and ack) can be put back on the queue with `requeue_unacked`.
//!   A delivery that cannot be put back stays in flight. Delivery is at-least-once,
//!   never exactly-once.
//! - **Close**: new messages are refused; workers drain what is queued and then get
//!   `QueueError::Closed`.
//!
//! `MemoryQueue` lives and dies with the process, so on a fresh queue
//! `requeue_unacked` finds nothing. Redelivery only matters for long-lived brokers,
//! or for a queue whose worker pool is restarted in-process.

use anyhow::Context;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc, watch};

/// Identifies one delivery of a message so the worker can acknowledge it.
pub type DeliveryTag = u64;

#[derive(Debug, Clone)]
pub struct Delivery {
    pub tag: DeliveryTag,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("task queue is closed")]
    Closed,

    #[error("task queue did not accept the message within {0:?}")]
    Timeout(Duration),

    #[error("unknown delivery tag {0}")]
    UnknownDelivery(DeliveryTag),

    #[error("broker error: {0}")]
    Broker(#[from] anyhow::Error),
}

/// Broker abstraction consumed by the gateway (producer side) and the workers
/// (consumer side).
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, body: Vec<u8>) -> Result<(), QueueError>;

    /// Waits until a message is available and claims it for the caller.
    async fn dequeue(&self) -> Result<Delivery, QueueError>;

    async fn ack(&self, tag: DeliveryTag) -> Result<(), QueueError>;

    /// Puts every unacknowledged delivery back on the queue. Returns how many moved.
    async fn requeue_unacked(&self) -> Result<usize, QueueError>;
}

/// In-process broker built on a bounded tokio channel.
///
/// FIFO per producer. Receivers share one `mpsc::Receiver` behind a mutex, so a
/// message is never seen by two workers at once.
pub struct MemoryQueue {
    sender: mpsc::Sender<Delivery>,
    receiver: Mutex<mpsc::Receiver<Delivery>>,
    /// Delivered but not yet acknowledged. `Tag -> Body`.
    in_flight: Arc<DashMap<DeliveryTag, Vec<u8>>>,
    next_tag: AtomicU64,
    closed: watch::Sender<bool>,
    enqueue_timeout: Duration,
}

impl MemoryQueue {
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
            in_flight: Arc::new(DashMap::new()),
            next_tag: AtomicU64::new(1),
            closed: watch::Sender::new(false),
            enqueue_timeout,
        }
    }

    /// Stops accepting new messages. Already queued messages can still be dequeued;
    /// once they are gone, waiting consumers get `QueueError::Closed`.
    pub fn close(&self) {
        self.closed.send_replace(true);
        tracing::warn!("Task queue closed for new submissions");
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Number of messages waiting to be dequeued.
    pub fn queued_count(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    async fn push(&self, delivery: Delivery) -> Result<(), QueueError> {
        match tokio::time::timeout(self.enqueue_timeout, self.sender.send(delivery)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(QueueError::Closed),
            Err(_) => Err(QueueError::Timeout(self.enqueue_timeout)),
        }
    }
}

/// Resolves once the queue is marked closed.
async fn closed_signal(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn enqueue(&self, body: Vec<u8>) -> Result<(), QueueError> {
        if self.is_closed() {
            return Err(QueueError::Closed);
        }

        let tag = self.next_tag.fetch_add(1, Ordering::SeqCst);
        self.push(Delivery { tag, body }).await?;

        tracing::trace!("Enqueued message {}", tag);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Delivery, QueueError> {
        let closed = self.closed.subscribe();
        let delivery = {
            let mut receiver = self.receiver.lock().await;
            tokio::select! {
                biased;
                delivery = receiver.recv() => delivery.ok_or(QueueError::Closed)?,
                _ = closed_signal(closed) => {
                    receiver.try_recv().map_err(|_| QueueError::Closed)?
                }
            }
        };

        self.in_flight.insert(delivery.tag, delivery.body.clone());
        tracing::trace!("Delivered message {}", delivery.tag);
        Ok(delivery)
    }

    async fn ack(&self, tag: DeliveryTag) -> Result<(), QueueError> {
        self.in_flight
            .remove(&tag)
            .map(|_| ())
            .ok_or(QueueError::UnknownDelivery(tag))
    }

    async fn requeue_unacked(&self) -> Result<usize, QueueError> {
        let tags: Vec<DeliveryTag> = self.in_flight.iter().map(|entry| *entry.key()).collect();

        let mut moved = 0;
        for tag in tags {
            if let Some((tag, body)) = self.in_flight.remove(&tag) {
                let pushed = self
                    .push(Delivery {
                        tag,
                        body: body.clone(),
                    })
                    .await;
                if pushed.is_err() {
                    self.in_flight.insert(tag, body);
                }
                pushed.with_context(|| format!("requeue of message {} failed", tag))?;
                moved += 1;
            }
        }

        if moved > 0 {
            tracing::warn!("Requeued {} unacknowledged messages", moved);
        }
        Ok(moved)
    }
}
