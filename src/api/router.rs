use super::envelope::ApiResponse;
use crate::executor::handlers::{
    handle_async_en_to_zh, handle_async_summarize, handle_async_zh_to_en, handle_get_task_status,
};
use crate::executor::protocol::{
    ENDPOINT_ASYNC_EN_TO_ZH, ENDPOINT_ASYNC_SUMMARIZE, ENDPOINT_ASYNC_ZH_TO_EN,
};
use crate::executor::service::TaskService;
use crate::text::TextProcessor;
use crate::text::handlers::*;

use axum::Json;
use axum::http::StatusCode;
use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Builds the full HTTP surface around an already constructed task service and
/// text processor. Cross-origin requests are allowed from anywhere.
pub fn build_router(service: Arc<TaskService>, processor: Arc<TextProcessor>) -> Router {
    Router::new()
        .route(ENDPOINT_FUNCTIONS, get(handle_list_functions))
        .route(ENDPOINT_ZH_TO_EN, post(handle_zh_to_en))
        .route(ENDPOINT_EN_TO_ZH, post(handle_en_to_zh))
        .route(ENDPOINT_SUMMARIZE, post(handle_summarize))
        .route(ENDPOINT_ASYNC_ZH_TO_EN, post(handle_async_zh_to_en))
        .route(ENDPOINT_ASYNC_EN_TO_ZH, post(handle_async_en_to_zh))
        .route(ENDPOINT_ASYNC_SUMMARIZE, post(handle_async_summarize))
        .route("/api/task/:task_id", get(handle_get_task_status))
        .fallback(handle_not_found)
        .layer(Extension(service))
        .layer(Extension(processor))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
}

async fn handle_not_found() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(404, "endpoint does not exist")),
    )
}
