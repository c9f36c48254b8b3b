//! HTTP error type.
//!
//! Handlers return `Result<_, ApiError>`; the error renders as the usual envelope with
//! `data: null`. Internal failures are logged with full detail and only a generic
//! message reaches the caller.

use super::envelope::ApiResponse;
use crate::executor::service::ServiceError;
use crate::text::client::TextServiceError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Logged in full; the caller only sees `public`.
    #[error("internal error: {detail}")]
    Internal { public: &'static str, detail: String },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) => m,
            ApiError::Internal { public, detail } => {
                tracing::error!(error = %detail, "{}", public);
                public.to_string()
            }
        };
        (
            status,
            Json(ApiResponse::failure(status.as_u16(), message)),
        )
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(m) => ApiError::BadRequest(m),
            ServiceError::TaskNotFound(id) => ApiError::NotFound(format!("task {} not found", id)),
            ServiceError::Dispatch(detail) => ApiError::Internal {
                public: "service temporarily unavailable",
                detail,
            },
            ServiceError::Store(e) => ApiError::Internal {
                public: "failed to fetch task result",
                detail: e.to_string(),
            },
        }
    }
}

impl From<TextServiceError> for ApiError {
    fn from(e: TextServiceError) -> Self {
        ApiError::Internal {
            public: "text service error",
            detail: e.to_string(),
        }
    }
}
