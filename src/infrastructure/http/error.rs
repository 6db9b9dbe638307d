//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;
use crate::domain::novel::NovelError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    ServiceUnavailable(String),
}

impl ApiError {
    fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno, error = %msg, "Resource not found");
                msg
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno, error = %msg, "Bad request");
                msg
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(errno, error = %msg, "Resource conflict");
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno, error = %msg, "Internal server error");
                msg
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno, error = %msg, "Service unavailable");
                msg
            }
        };

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<NovelError> for ApiError {
    fn from(e: NovelError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            e @ ApplicationError::LengthMismatch { .. } => ApiError::BadRequest(e.to_string()),
            e @ ApplicationError::GlossaryStale => ApiError::Conflict(e.to_string()),
            ApplicationError::UpstreamFetch(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::TranslatorBackend(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let stale: ApiError = ApplicationError::GlossaryStale.into();
        assert_eq!(stale.errno(), errno::CONFLICT);

        let mismatch: ApiError = ApplicationError::LengthMismatch {
            expected: 3,
            actual: 2,
        }
        .into();
        assert!(matches!(mismatch, ApiError::BadRequest(ref msg) if msg.contains("expected 3")));

        let upstream: ApiError = ApplicationError::UpstreamFetch("timeout".into()).into();
        assert_eq!(upstream.errno(), errno::SERVICE_UNAVAILABLE);

        let missing: ApiError = ApplicationError::not_found("Novel", "kakuyomu/1").into();
        assert_eq!(missing.errno(), errno::NOT_FOUND);
    }
}
