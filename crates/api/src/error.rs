use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use snapbox_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "success": false, "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `snapbox_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The JSON body could not be read or deserialized.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// The query string could not be deserialized.
    #[error(transparent)]
    Query(#[from] QueryRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Extractor rejections ---
            AppError::Json(rejection) => {
                (rejection.status(), "INVALID_REQUEST", rejection.body_text())
            }
            AppError::Query(rejection) => {
                (rejection.status(), "INVALID_REQUEST", rejection.body_text())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, error code, and client message.
///
/// Storage and internal failures are logged in full and reported with a
/// sanitized message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::MalformedPayload(msg) => (
            StatusCode::BAD_REQUEST,
            "MALFORMED_PAYLOAD",
            format!("Malformed payload: {msg}"),
        ),
        CoreError::UnsupportedImage(msg) => (
            StatusCode::BAD_REQUEST,
            "UNSUPPORTED_IMAGE",
            format!("Unsupported image: {msg}"),
        ),
        CoreError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "File not found".to_string(),
        ),
        CoreError::InvalidName(name) => (
            StatusCode::BAD_REQUEST,
            "INVALID_NAME",
            format!("Invalid media name '{name}'"),
        ),
        CoreError::StorageIo { .. } => {
            tracing::error!(error = %err, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Storage operation failed".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
