//! Task Protocol Definitions
//!
//! Defines the message carried on the task queue and the Data Transfer Objects (DTOs)
//! used by the submission and status endpoints.
//!
//! Queue messages travel as JSON bytes. The `kind` field is kept as a raw string on
//! the wire so that a worker can tell a well-formed message with an unknown kind
//! apart from one it cannot parse at all.

use super::types::*;
use crate::text::types::render_output;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENDPOINT_ASYNC_ZH_TO_EN: &str = "/api/async/translate/zh_to_en";
pub const ENDPOINT_ASYNC_EN_TO_ZH: &str = "/api/async/translate/en_to_zh";
pub const ENDPOINT_ASYNC_SUMMARIZE: &str = "/api/async/summarize";
pub const ENDPOINT_TASK_STATUS: &str = "/api/task";

/// Builds the polling URL handed back to the submitter.
pub fn result_url(task_id: &TaskId) -> String {
    format!("{}/{}", ENDPOINT_TASK_STATUS, task_id.0)
}

/// Raw task-request message as it sits on the queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskMessage {
    pub id: TaskId,
    pub kind: String,
    pub input: String,
}

/// A decoded message whose kind is known to this worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub id: TaskId,
    pub kind: TaskKind,
    pub input: String,
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed task message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed envelope, but the kind is not one this service executes.
    #[error("task {id}: {source}")]
    UnknownKind {
        id: TaskId,
        #[source]
        source: UnknownTaskKind,
    },
}

impl TaskMessage {
    pub fn new(id: TaskId, kind: TaskKind, input: String) -> Self {
        Self {
            id,
            kind: kind.as_str().to_string(),
            input,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses queue bytes into a request this service can execute.
    pub fn decode(body: &[u8]) -> Result<TaskRequest, MessageError> {
        let message: TaskMessage = serde_json::from_slice(body)?;
        match message.kind.parse::<TaskKind>() {
            Ok(kind) => Ok(TaskRequest {
                id: message.id,
                kind,
                input: message.input,
            }),
            Err(source) => Err(MessageError::UnknownKind {
                id: message.id,
                source,
            }),
        }
    }
}

/// Body of every text submission, synchronous or not.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SubmitTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskResponse {
    pub task_id: TaskId,
    pub status: String,
    pub result_url: String,
}

/// What a polling client sees for one task.
///
/// `result` is always present (null unless completed); `error` only appears once failed.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String,
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TaskStatusResponse {
    pub fn from_record(record: &TaskRecord) -> Self {
        let result = match (record.state, &record.result) {
            (TaskState::Success, Some(text)) => {
                Some(render_output(record.kind, &record.input, text))
            }
            _ => None,
        };

        let error = match record.state {
            TaskState::Failed => Some(
                record
                    .error
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            _ => None,
        };

        Self {
            status: record.state.as_status().to_string(),
            result,
            error,
        }
    }
}
