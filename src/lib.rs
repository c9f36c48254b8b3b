//! Text Task Service Library
//!
//! Translation and summarization exposed over HTTP, each operation available both
//! synchronously and as a fire-and-poll background task.
//!
//! ## Architecture Modules
//! - **`executor`**: the asynchronous job pipeline. Submission gateway, task queue,
//!   worker pool and status query, with an explicit task lifecycle state machine.
//! - **`storage`**: the result store, the single source of truth for task state.
//! - **`text`**: the external text service client and the synchronous endpoints.
//! - **`api`**: response envelope, HTTP error mapping and the router.
//! - **`config`**: command line / environment configuration.

pub mod api;
pub mod config;
pub mod executor;
pub mod storage;
pub mod text;
