use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a task.
///
/// Wrapper around a UUID string to ensure global uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The text operation a task performs. Closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[serde(rename = "zh_to_en")]
    TranslateZhToEn,
    #[serde(rename = "en_to_zh")]
    TranslateEnToZh,
    Summarize,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [
        TaskKind::TranslateZhToEn,
        TaskKind::TranslateEnToZh,
        TaskKind::Summarize,
    ];

    /// Wire name used on the queue and in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::TranslateZhToEn => "zh_to_en",
            TaskKind::TranslateEnToZh => "en_to_zh",
            TaskKind::Summarize => "summarize",
        }
    }

    /// Key under which the transformed text is rendered next to `original`.
    pub fn output_field(&self) -> &'static str {
        match self {
            TaskKind::TranslateZhToEn | TaskKind::TranslateEnToZh => "translated",
            TaskKind::Summarize => "summarized",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task kind: {0}")]
pub struct UnknownTaskKind(pub String);

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownTaskKind(s.to_string()))
    }
}

/// Lifecycle state of a task.
///
/// `Pending -> Processing -> {Success, Failed}`. Terminal states never change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Submitted, not yet picked up by any worker.
    Pending,
    /// Owned by a worker that is calling the text service.
    Processing,
    Success,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failed)
    }

    /// Name exposed to polling clients.
    pub fn as_status(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Processing => "processing",
            TaskState::Success => "completed",
            TaskState::Failed => "failed",
        }
    }
}

/// Outcome of running one task against the text service.
///
/// Consumed by the state transition logic; failures carry a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded(String),
    Failed(String),
}

/// A state change requested against a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTransition {
    BeginProcessing,
    Finish(TaskOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal transition from {from:?} via {attempted}")]
pub struct TransitionError {
    pub from: TaskState,
    pub attempted: &'static str,
}

/// The record kept in the result store for every submitted task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub kind: TaskKind,
    pub input: String,
    pub state: TaskState,
    pub result: Option<String>,
    pub error: Option<String>,
    /// Timestamp (ms) when the task was submitted.
    pub submitted_at: u64,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

impl TaskRecord {
    pub fn pending(id: TaskId, kind: TaskKind, input: String) -> Self {
        Self {
            id,
            kind,
            input,
            state: TaskState::Pending,
            result: None,
            error: None,
            submitted_at: now_ms(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Applies a transition in place, refusing anything the state machine forbids.
    ///
    /// `BeginProcessing` on a record that is already `Processing` is accepted:
    /// a redelivered message re-takes ownership of its task.
    pub fn apply(&mut self, transition: TaskTransition) -> Result<(), TransitionError> {
        match (self.state, transition) {
            (TaskState::Pending | TaskState::Processing, TaskTransition::BeginProcessing) => {
                self.state = TaskState::Processing;
                self.started_at = Some(now_ms());
                Ok(())
            }
            (TaskState::Processing, TaskTransition::Finish(outcome)) => {
                match outcome {
                    TaskOutcome::Succeeded(text) => {
                        self.state = TaskState::Success;
                        self.result = Some(text);
                    }
                    TaskOutcome::Failed(error) => {
                        self.state = TaskState::Failed;
                        self.error = Some(error);
                    }
                }
                self.finished_at = Some(now_ms());
                Ok(())
            }
            (from, TaskTransition::BeginProcessing) => Err(TransitionError {
                from,
                attempted: "begin_processing",
            }),
            (from, TaskTransition::Finish(_)) => Err(TransitionError {
                from,
                attempted: "finish",
            }),
        }
    }
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
