use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::classifier::ClassifierError;
use crate::store::StoreError;

/// Unified API error type for all route handlers.
///
/// Maps the service error taxonomy onto HTTP statuses: invalid input is
/// 400, a failing model runtime is 503 (request-scoped, the process
/// continues), and storage failures are 500.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ModelUnavailable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ModelUnavailable(msg) => {
                log::error!("model unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "classification model unavailable".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::ValidationError(msg) => ApiError::BadRequest(msg),
            other => ApiError::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
