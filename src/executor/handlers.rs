use super::protocol::*;
use super::service::TaskService;
use super::types::*;
use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;

use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json, extract::Path};
use std::sync::Arc;

type Body = Result<Json<SubmitTextRequest>, JsonRejection>;

pub async fn handle_async_zh_to_en(
    Extension(service): Extension<Arc<TaskService>>,
    body: Body,
) -> Result<Json<ApiResponse<SubmitTaskResponse>>, ApiError> {
    submit(&service, TaskKind::TranslateZhToEn, body).await
}

pub async fn handle_async_en_to_zh(
    Extension(service): Extension<Arc<TaskService>>,
    body: Body,
) -> Result<Json<ApiResponse<SubmitTaskResponse>>, ApiError> {
    submit(&service, TaskKind::TranslateEnToZh, body).await
}

pub async fn handle_async_summarize(
    Extension(service): Extension<Arc<TaskService>>,
    body: Body,
) -> Result<Json<ApiResponse<SubmitTaskResponse>>, ApiError> {
    submit(&service, TaskKind::Summarize, body).await
}

async fn submit(
    service: &TaskService,
    kind: TaskKind,
    body: Body,
) -> Result<Json<ApiResponse<SubmitTaskResponse>>, ApiError> {
    // An unreadable body is treated like a missing `text` field.
    let text = match body {
        Ok(Json(req)) => req.text,
        Err(rejection) => {
            tracing::debug!("Rejected {} submission body: {}", kind, rejection);
            None
        }
    };

    let handle = service.submit(kind, text).await?;

    Ok(Json(ApiResponse::success(
        "task submitted",
        SubmitTaskResponse {
            result_url: result_url(&handle.id),
            status: handle.state.as_status().to_string(),
            task_id: handle.id,
        },
    )))
}

pub async fn handle_get_task_status(
    Extension(service): Extension<Arc<TaskService>>,
    Path(task_id_str): Path<String>,
) -> Result<Json<ApiResponse<TaskStatusResponse>>, ApiError> {
    let task_id = TaskId(task_id_str);
    let record = service.status(&task_id).await?;

    Ok(Json(ApiResponse::success(
        "success",
        TaskStatusResponse::from_record(&record),
    )))
}
