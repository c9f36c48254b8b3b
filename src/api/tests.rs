//! HTTP Surface Tests
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`: submission,
//! polling to a terminal state, envelope shape and error codes.

#[cfg(test)]
mod tests {
    use crate::api::router::build_router;
    use crate::executor::executor::{ExecutorConfig, TaskExecutor};
    use crate::executor::queue::MemoryQueue;
    use crate::executor::service::TaskService;
    use crate::executor::types::TaskKind;
    use crate::storage::memory::MemoryResultStore;
    use crate::text::TextProcessor;
    use crate::text::client::{TextService, TextServiceError};

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FakeModel;

    #[async_trait]
    impl TextService for FakeModel {
        async fn transform(&self, kind: TaskKind, text: &str) -> Result<String, TextServiceError> {
            match kind {
                TaskKind::TranslateZhToEn if text == "你好" => Ok("Hello".to_string()),
                TaskKind::Summarize => Ok(text.chars().take(5).collect()),
                _ => Ok(format!("[{}] {}", kind, text)),
            }
        }
    }

    struct BrokenModel;

    #[async_trait]
    impl TextService for BrokenModel {
        async fn transform(
            &self,
            _kind: TaskKind,
            _text: &str,
        ) -> Result<String, TextServiceError> {
            Err(TextServiceError::Status {
                status: 500,
                body: "CUDA out of memory".to_string(),
            })
        }
    }

    struct App {
        router: Router,
        queue: Arc<MemoryQueue>,
    }

    async fn app(text_service: Arc<dyn TextService>) -> App {
        let queue = Arc::new(MemoryQueue::new(64, Duration::from_millis(50)));
        let store = Arc::new(MemoryResultStore::new());
        let executor = TaskExecutor::new(
            queue.clone(),
            store.clone(),
            text_service.clone(),
            ExecutorConfig {
                worker_count: 2,
                task_timeout: Duration::from_secs(2),
            },
        );
        executor.start().await;

        let service = TaskService::new(queue.clone(), store);
        let processor = TextProcessor::new(text_service, Duration::from_secs(2));
        App {
            router: build_router(service, processor),
            queue,
        }
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn poll_until_done(router: &Router, result_url: &str) -> Value {
        for _ in 0..500 {
            let (status, body) = call(router, get(result_url)).await;
            assert_eq!(status, StatusCode::OK);
            let state = body["data"]["status"].as_str().unwrap().to_string();
            if state == "completed" || state == "failed" {
                return body["data"].clone();
            }
            assert!(state == "pending" || state == "processing", "bad status {}", state);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task at {} never finished", result_url);
    }

    // ============================================================
    // Async submission & polling
    // ============================================================

    #[tokio::test]
    async fn test_async_translation_round_trip() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, body) = call(
            &app.router,
            post("/api/async/translate/zh_to_en", json!({"text": "你好"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        let task_id = body["data"]["task_id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(
            body["data"]["result_url"],
            format!("/api/task/{}", task_id)
        );

        let data = poll_until_done(&app.router, &format!("/api/task/{}", task_id)).await;
        assert_eq!(data["status"], "completed");
        assert_eq!(data["result"]["original"], "你好");
        assert_eq!(data["result"]["translated"], "Hello");
        assert!(data.get("error").is_none());
    }

    #[tokio::test]
    async fn test_async_summary_uses_summarized_field() {
        let app = app(Arc::new(FakeModel)).await;

        let (_, body) = call(
            &app.router,
            post("/api/async/summarize", json!({"text": "a very long story"})),
        )
        .await;
        let url = body["data"]["result_url"].as_str().unwrap().to_string();

        let data = poll_until_done(&app.router, &url).await;
        assert_eq!(data["result"]["summarized"], "a ver");
    }

    #[tokio::test]
    async fn test_failed_task_reports_error_and_null_result() {
        let app = app(Arc::new(BrokenModel)).await;

        let (_, body) = call(
            &app.router,
            post("/api/async/translate/en_to_zh", json!({"text": "hello"})),
        )
        .await;
        let url = body["data"]["result_url"].as_str().unwrap().to_string();

        let data = poll_until_done(&app.router, &url).await;
        assert_eq!(data["status"], "failed");
        assert!(data["result"].is_null());
        assert!(
            data["error"]
                .as_str()
                .unwrap()
                .contains("CUDA out of memory")
        );
    }

    #[tokio::test]
    async fn test_empty_or_missing_text_is_bad_request() {
        let app = app(Arc::new(FakeModel)).await;

        for body in [json!({"text": ""}), json!({}), json!({"text": null})] {
            let (status, response) =
                call(&app.router, post("/api/async/summarize", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["code"], 400);
            assert!(response["data"].is_null());
        }

        let no_body = Request::builder()
            .method("POST")
            .uri("/api/async/summarize")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(&app.router, no_body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.queue.queued_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_server_error() {
        let app = app(Arc::new(FakeModel)).await;
        app.queue.close();

        let (status, body) = call(
            &app.router,
            post("/api/async/translate/zh_to_en", json!({"text": "你好"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 500);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, body) = call(&app.router, get("/api/task/does-not-exist")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
        assert!(body["data"].is_null());
    }

    // ============================================================
    // Sync endpoints & catalogue
    // ============================================================

    #[tokio::test]
    async fn test_sync_translation() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, body) = call(
            &app.router,
            post("/api/translate/zh_to_en", json!({"text": "你好"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["original"], "你好");
        assert_eq!(body["data"]["translated"], "Hello");
    }

    #[tokio::test]
    async fn test_sync_failure_is_server_error() {
        let app = app(Arc::new(BrokenModel)).await;

        let (status, body) =
            call(&app.router, post("/api/summarize", json!({"text": "story"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "text service error");
    }

    #[tokio::test]
    async fn test_sync_empty_text_is_bad_request() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, _) = call(
            &app.router,
            post("/api/translate/en_to_zh", json!({"text": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_function_catalogue() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, body) = call(&app.router, get("/api/functions")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(
            body["data"][2]["async_endpoint"],
            "/api/async/summarize"
        );
    }

    // ============================================================
    // Cross-origin access
    // ============================================================

    #[tokio::test]
    async fn test_preflight_allows_any_origin() {
        let app = app(Arc::new(FakeModel)).await;
        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/api/async/translate/zh_to_en")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.router.clone().oneshot(preflight).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-methods")
        );
    }

    #[tokio::test]
    async fn test_cross_origin_poll_carries_cors_header() {
        let app = app(Arc::new(FakeModel)).await;
        let request = Request::builder()
            .uri("/api/functions")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();

        let response = app.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_uses_envelope() {
        let app = app(Arc::new(FakeModel)).await;

        let (status, body) = call(&app.router, get("/api/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }
}
