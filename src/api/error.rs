//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::integrations::IntegrationError;
use crate::journal::ReflectionError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Journal model rejected the request
    #[error("{0}")]
    Journal(#[from] ReflectionError),

    /// Store layer error
    #[error("Storage error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// A daily context source is disabled or unreachable
    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Journal(ReflectionError::Configuration(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_MODE")
            }
            ApiError::Journal(ReflectionError::SubmissionInFlight(_)) => {
                (StatusCode::CONFLICT, "SUBMISSION_IN_FLIGHT")
            }
            ApiError::Journal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SUBMISSION_ERROR"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Integration(IntegrationError::NotConfigured(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "INTEGRATION_UNAVAILABLE")
            }
            ApiError::Integration(_) => (StatusCode::BAD_GATEWAY, "INTEGRATION_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::ReportMode;

    #[test]
    fn test_status_codes() {
        let resp = ApiError::Validation("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = "noon".parse::<ReportMode>().unwrap_err().into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::NotFound("Reflection not found".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::from(IntegrationError::NotConfigured("Things 3")).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = ApiError::from(IntegrationError::ApiError("down".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
