//! Text Service Client
//!
//! The external capability that actually translates or summarizes text. The rest of
//! the crate only sees the `TextService` trait; `HttpTextService` is the production
//! implementation talking to a model server over HTTP.

use super::types::{TransformRequest, TransformResponse};
use crate::executor::types::TaskKind;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub const ENDPOINT_TRANSFORM: &str = "/transform";

#[derive(Debug, Error)]
pub enum TextServiceError {
    #[error("text service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("text service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text service returned no text")]
    EmptyOutput,

    #[error("text service rejected the input: {0}")]
    Rejected(String),

    #[error("text service timed out after {0:?}")]
    Timeout(Duration),
}

/// `transform(kind, text) -> text`. Untrusted: may be slow, fail, or panic.
#[async_trait]
pub trait TextService: Send + Sync {
    async fn transform(&self, kind: TaskKind, text: &str) -> Result<String, TextServiceError>;
}

pub struct HttpTextService {
    base_url: String,
    http_client: reqwest::Client,
    attempts: usize,
}

impl HttpTextService {
    /// `timeout` bounds each individual HTTP attempt.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        attempts: usize,
    ) -> Result<Self, TextServiceError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            attempts: attempts.max(1),
        })
    }

    /// Retries transport failures with exponential backoff plus jitter.
    /// HTTP error statuses are returned as-is and not retried.
    async fn post_with_retry<T: serde::Serialize + Sync>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<reqwest::Response, TextServiceError> {
        let mut delay_ms = 150u64;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.http_client.post(url).json(payload).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt >= self.attempts => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        "Text service attempt {}/{} failed: {}",
                        attempt,
                        self.attempts,
                        e
                    );
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }
    }
}

#[async_trait]
impl TextService for HttpTextService {
    async fn transform(&self, kind: TaskKind, text: &str) -> Result<String, TextServiceError> {
        let url = format!("{}{}", self.base_url, ENDPOINT_TRANSFORM);
        let payload = TransformRequest {
            kind,
            text: text.to_string(),
        };

        let response = self.post_with_retry(&url, &payload).await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(TextServiceError::Rejected(response.text().await?));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let output: TransformResponse = response.json().await?;
        if output.text.trim().is_empty() {
            return Err(TextServiceError::EmptyOutput);
        }

        tracing::debug!(
            "Text service produced {} bytes for {} request",
            output.text.len(),
            kind
        );
        Ok(output.text)
    }
}
