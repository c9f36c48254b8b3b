//! Text Operations Module
//!
//! Everything that talks to, or is served directly by, the external text service.
//!
//! - **`client`**: the `TextService` capability and its HTTP implementation.
//! - **`handlers`**: the synchronous endpoints, which call the text service inline
//!   instead of going through the task queue, and the operation catalogue.
//! - **`types`**: wire types shared with the executor.

pub mod client;
pub mod handlers;
pub mod types;


use crate::executor::types::TaskKind;
use client::{TextService, TextServiceError};
use std::sync::Arc;
use std::time::Duration;

/// Runs text-service calls on the request path, bounded by a timeout.
pub struct TextProcessor {
    service: Arc<dyn TextService>,
    timeout: Duration,
}

impl TextProcessor {
    pub fn new(service: Arc<dyn TextService>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self { service, timeout })
    }

    pub async fn run(&self, kind: TaskKind, text: &str) -> Result<String, TextServiceError> {
        match tokio::time::timeout(self.timeout, self.service.transform(kind, text)).await {
            Ok(Ok(output)) if output.trim().is_empty() => Err(TextServiceError::EmptyOutput),
            Ok(result) => result,
            Err(_) => Err(TextServiceError::Timeout(self.timeout)),
        }
    }
}
