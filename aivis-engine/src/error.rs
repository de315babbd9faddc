//! API error types for the visibility engine

use crate::services::check_orchestrator::CheckError;
use crate::services::quota_guard::QuotaError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
///
/// Every expected failure mode maps to a typed variant with a stable error
/// code; handlers never surface raw exceptions.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown or unowned resource (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request shape (400)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Monthly check budget exhausted at admission time (429)
    #[error("Plan limit reached: {0}")]
    PlanLimitReached(String),

    /// An external capability failed outside any per-item isolation (502)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Storage failure (500)
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::PlanLimitReached(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "PLAN_LIMIT_REACHED", msg)
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE", msg),
            ApiError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_FAILURE",
                msg,
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<aivis_common::Error> for ApiError {
    fn from(err: aivis_common::Error) -> Self {
        match err {
            aivis_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            aivis_common::Error::InvalidInput(msg) => ApiError::Validation(msg),
            aivis_common::Error::Database(e) => ApiError::Persistence(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::LimitReached { .. } => ApiError::PlanLimitReached(err.to_string()),
            QuotaError::Storage(e) => e.into(),
        }
    }
}

impl From<CheckError> for ApiError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Validation(msg) => ApiError::Validation(msg),
            CheckError::NotFound(msg) => ApiError::NotFound(msg),
            CheckError::Quota(e) => e.into(),
            CheckError::Storage(e) => e.into(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_maps_to_plan_limit() {
        let err: ApiError = QuotaError::LimitReached {
            used: 25,
            requested: 3,
            limit: 25,
        }
        .into();
        assert!(matches!(err, ApiError::PlanLimitReached(_)));
    }

    #[test]
    fn test_common_not_found_keeps_its_meaning() {
        let err: ApiError = aivis_common::Error::NotFound("project".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_check_validation_maps_to_validation() {
        let err: ApiError = CheckError::Validation("empty providers".to_string()).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
