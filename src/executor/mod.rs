//! Asynchronous Task Executor Module
//!
//! Turns text-processing requests into tasks that run in the background and can be
//! polled for their result.
//!
//! ## Architecture Overview
//! The executor follows a **push-to-queue, poll-for-result** model:
//! 1. **Submission**: `TaskService` validates the input, stores a `Pending` record and
//!    puts a message on the `TaskQueue`. The caller gets the task id back at once.
//! 2. **Execution**: `TaskExecutor` workers block on the queue. A worker claims a task by
//!    moving its record to `Processing`, calls the text service and records
//!    `Success` or `Failed`.
//! 3. **Polling**: status queries read the result store and never change it.
//!
//! Delivery is at-least-once: a message is acknowledged only after the terminal state
//! is stored, and an unacknowledged message may come back.
//!
//! ## Submodules
//! - **`types`**: task identity, kinds, the lifecycle state machine.
//! - **`protocol`**: queue message format and HTTP DTOs.
//! - **`queue`**: the broker abstraction and its in-memory implementation.
//! - **`service`**: the submission gateway and status query.
//! - **`executor`**: the worker pool.
//! - **`handlers`**: the async submit and status endpoints.

pub mod executor;
pub mod handlers;
pub mod protocol;
pub mod queue;
pub mod service;
pub mod types;
