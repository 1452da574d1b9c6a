//! API error handling.
//!
//! This module provides error types and response formatting for the API.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::FieldErrors;
use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Messages per field, present only for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error carrying every field message.
    ///
    /// The summary message is the first field message, or a generic one if
    /// the set is empty.
    #[must_use]
    pub fn validation(errors: &FieldErrors) -> Self {
        Self {
            code: "VALIDATION_ERROR".to_string(),
            message: errors
                .first_message()
                .unwrap_or_else(|| "The given data was invalid.".to_string()),
            errors: Some(errors.messages()),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 401 Unauthorized response.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiError::new("UNAUTHENTICATED", "Unauthenticated."),
        )
    }

    /// Creates a 403 Forbidden response.
    ///
    /// Carries no field detail.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            ApiError::new("FORBIDDEN", "This action is unauthorized."),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 409 Conflict response.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
    }

    /// Creates a response for a body that could not be decoded.
    ///
    /// `status` is 400 for a syntax error and 422 for a body of the wrong shape.
    #[must_use]
    pub fn invalid_json(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, ApiError::new("INVALID_JSON", message))
    }

    /// Creates a 422 Unprocessable Entity response for rule violations.
    #[must_use]
    pub fn validation_error(errors: &FieldErrors) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::validation(errors),
        )
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => Self::not_found(message),
            RepositoryError::UniqueViolation(constraint) => {
                Self::conflict(format!("Duplicate value for {constraint}"))
            }
            // Internal errors should not expose details to clients.
            RepositoryError::DatabaseError(_) => {
                tracing::error!(%error, "Repository failure");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
