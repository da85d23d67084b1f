//! HTTP rendering of [`AppError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde::Serialize;

/// Wraps a domain error so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub result: bool,
    pub error_type: &'static str,
    pub error_message: String,
}

impl ApiError {
    pub fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        let (status, error_type) = match &self.0 {
            AppError::MissingCredential => (StatusCode::BAD_REQUEST, "MissingCredential"),
            AppError::UnknownCredential | AppError::NotFound(..) => {
                (StatusCode::NOT_FOUND, "NotFound")
            }
            AppError::PermissionDenied => (StatusCode::BAD_REQUEST, "PermissionError"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        // Infrastructure details stay in the log.
        let error_message = match &self.0 {
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            ErrorBody {
                result: false,
                error_type,
                error_message,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
