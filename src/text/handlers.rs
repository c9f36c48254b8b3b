use super::TextProcessor;
use super::types::{FunctionInfo, render_output};
use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::executor::protocol::{
    ENDPOINT_ASYNC_EN_TO_ZH, ENDPOINT_ASYNC_SUMMARIZE, ENDPOINT_ASYNC_ZH_TO_EN, SubmitTextRequest,
};
use crate::executor::service::validate_text;
use crate::executor::types::TaskKind;

use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use std::sync::Arc;

pub const ENDPOINT_FUNCTIONS: &str = "/api/functions";
pub const ENDPOINT_ZH_TO_EN: &str = "/api/translate/zh_to_en";
pub const ENDPOINT_EN_TO_ZH: &str = "/api/translate/en_to_zh";
pub const ENDPOINT_SUMMARIZE: &str = "/api/summarize";

type Body = Result<Json<SubmitTextRequest>, JsonRejection>;

/// The operations this service offers, with their sync and async routes.
pub fn function_catalogue() -> Vec<FunctionInfo> {
    [
        (1, "zh_to_en translation", ENDPOINT_ZH_TO_EN, ENDPOINT_ASYNC_ZH_TO_EN),
        (2, "en_to_zh translation", ENDPOINT_EN_TO_ZH, ENDPOINT_ASYNC_EN_TO_ZH),
        (3, "text summary", ENDPOINT_SUMMARIZE, ENDPOINT_ASYNC_SUMMARIZE),
    ]
    .into_iter()
    .map(|(id, name, endpoint, async_endpoint)| FunctionInfo {
        id,
        name: name.to_string(),
        endpoint: endpoint.to_string(),
        async_endpoint: async_endpoint.to_string(),
    })
    .collect()
}

pub async fn handle_list_functions() -> Json<ApiResponse<Vec<FunctionInfo>>> {
    Json(ApiResponse::success("success", function_catalogue()))
}

pub async fn handle_zh_to_en(
    Extension(processor): Extension<Arc<TextProcessor>>,
    body: Body,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    transform(&processor, TaskKind::TranslateZhToEn, body).await
}

pub async fn handle_en_to_zh(
    Extension(processor): Extension<Arc<TextProcessor>>,
    body: Body,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    transform(&processor, TaskKind::TranslateEnToZh, body).await
}

pub async fn handle_summarize(
    Extension(processor): Extension<Arc<TextProcessor>>,
    body: Body,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    transform(&processor, TaskKind::Summarize, body).await
}

async fn transform(
    processor: &TextProcessor,
    kind: TaskKind,
    body: Body,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let text = validate_text(body.ok().and_then(|Json(req)| req.text))?;

    let output = processor.run(kind, &text).await?;
    tracing::info!("Served synchronous {} request ({} bytes)", kind, text.len());

    let message = match kind {
        TaskKind::Summarize => "summary succeeded",
        _ => "translation succeeded",
    };
    Ok(Json(ApiResponse::success(
        message,
        render_output(kind, &text, &output),
    )))
}
