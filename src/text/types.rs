use crate::executor::types::TaskKind;
use serde::{Deserialize, Serialize};

/// Body sent to the external text service.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransformRequest {
    pub kind: TaskKind,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransformResponse {
    pub text: String,
}

/// One entry of the operation catalogue served at `/api/functions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionInfo {
    pub id: u32,
    pub name: String,
    pub endpoint: String,
    pub async_endpoint: String,
}

/// Renders a finished transformation as `{original, translated}` or `{original, summarized}`.
pub fn render_output(kind: TaskKind, original: &str, output: &str) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert(
        "original".to_string(),
        serde_json::Value::String(original.to_string()),
    );
    body.insert(
        kind.output_field().to_string(),
        serde_json::Value::String(output.to_string()),
    );
    serde_json::Value::Object(body)
}
