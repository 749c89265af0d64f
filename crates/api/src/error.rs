//! Request-boundary error handling
//!
//! Every failure while serving a reading becomes a structured
//! `{"status": "error", "message": ...}` body; none reach the runtime.

use axum::{
    extract::rejection::BytesRejection,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    BoxError, Json,
};
use fusion_engine::FusionError;
use inference_engine::InferenceError;
use reading_validator::ValidationError;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fusion(#[from] FusionError),

    /// Body could not be buffered (too large, aborted)
    #[error("{}", .0.body_text())]
    Body(#[from] BytesRejection),

    #[error("Request timed out")]
    Timeout,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Fusion(FusionError::Domain(_)) => StatusCode::BAD_REQUEST,
            ApiError::Fusion(FusionError::Collaborator(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) | ApiError::Body(_) => "validation",
            ApiError::Fusion(FusionError::Domain(_)) => "domain",
            ApiError::Fusion(FusionError::Collaborator(_)) => "collaborator",
            ApiError::Timeout => "timeout",
            ApiError::MethodNotAllowed | ApiError::NotFound(_) => "routing",
            ApiError::Internal(_) => "internal",
        }
    }
}

/// Errors raised by middleware (timeouts) before a handler responds
pub async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Failure body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(kind = self.kind(), status = status.as_u16(), error = %self, "Error processing reading");
        metrics::counter!("fusion_errors_total", "kind" => self.kind()).increment(1);

        let body = ErrorResponse {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures that stop the service from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Model loading failed: {0}")]
    Models(#[from] InferenceError),

    #[error("Metrics exporter failed: {0}")]
    Metrics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
