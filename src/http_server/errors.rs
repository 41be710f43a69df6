//! # HTTP Errors
//!
//! Error type returned by route handlers and its JSON rendering.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::users::{FieldError, UserError, ValidationErrors};

use super::rate_limit::Throttled;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Body or path parameter failed validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Body is not JSON of the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Client exceeded a throttle window
    #[error("Too Many Requests")]
    RateLimited(Throttled),

    // ==================
    // Repository Errors
    // ==================
    #[error("{0}")]
    User(#[from] UserError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::User(UserError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::User(UserError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<Throttled> for ApiError {
    fn from(throttled: Throttled) -> Self {
        ApiError::RateLimited(throttled)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let code = err.status_code().as_u16();
        match err {
            ApiError::Validation(errors) => Self {
                error: "Validation failed".to_string(),
                code,
                details: errors.into_errors(),
            },
            other => Self {
                error: other.to_string(),
                code,
                details: Vec::new(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match &self {
            ApiError::RateLimited(throttled) => Some(throttled.retry_after_secs()),
            _ => None,
        };

        let mut response = (status, Json(ErrorResponse::from(self))).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(ValidationErrors::single("name", "bad")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(UserError::NotFound(1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(UserError::Internal("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "email must be an email");
        errors.push("role", "Valid role required");

        let body = serde_json::to_value(ErrorResponse::from(ApiError::from(errors))).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["details"][1]["field"], "role");
        assert_eq!(body["details"][1]["message"], "Valid role required");
    }

    #[test]
    fn test_not_found_body_has_no_details() {
        let body =
            serde_json::to_value(ErrorResponse::from(ApiError::from(UserError::NotFound(9))))
                .unwrap();
        assert_eq!(body["error"], "User with id 9 not found");
        assert!(body.get("details").is_none());
    }
}
