//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::OrchestrationError;

const MISSING_TOKEN: &str = "Token de autenticación requerido";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request carried no bearer token.
    Unauthorized,
    /// The request body could not be read.
    BadRequest(String),
    /// A workflow failed.
    Orchestration(OrchestrationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Unauthorized => OrchestrationError::unauthorized(MISSING_TOKEN),
            ApiError::BadRequest(msg) => OrchestrationError::validation(msg),
            ApiError::Orchestration(err) => err,
        };

        let status =
            StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(status = err.status_code, error = %err, "orchestration error");
        } else {
            tracing::warn!(status = err.status_code, error = %err, "request rejected");
        }

        let body = serde_json::json!({ "error": err.message, "details": err.details });
        (status, axum::Json(body)).into_response()
    }
}

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        ApiError::Orchestration(err)
    }
}
