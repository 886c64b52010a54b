// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! One error type covers every failure a handler or middleware can produce.
//! It maps to an HTTP status, a stable error code, and the shared error body
//! shape, so the client SDK can rebuild typed errors from any response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use steward_core::ErrorBody;
use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
///
/// Designed to be returned from handlers and middleware and automatically
/// converted to a well-formed HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// No usable credential on a protected request (401).
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Error message.
        message: String,
    },

    /// Refresh token rejected (403).
    ///
    /// Signature failure, expiry, and store mismatch are deliberately merged
    /// into this single kind so a caller cannot tell which check failed.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Error message.
        message: String,
    },

    /// Valid identity, insufficient role (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Conflict with existing state (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates an invalid token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken { .. } => StatusCode::FORBIDDEN,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthenticated { .. } => "UNAUTHENTICATED",
            ApiError::InvalidToken { .. } => "INVALID_TOKEN",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Validation { .. } => "VALIDATION_FAILURE",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-facing error message.
    ///
    /// Safe to show to end users; internal detail stays in the `Display`
    /// form and the logs.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthenticated { message } => message.clone(),
            ApiError::InvalidToken { message } => message.clone(),
            ApiError::Forbidden { message } => message.clone(),
            ApiError::Validation { message, .. } => format!("Validation failed: {}", message),
            ApiError::Conflict { message } => message.clone(),
            ApiError::Internal { .. } => "Server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Internal { .. })
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let mut body = ErrorBody::new(error_code, self.user_message());
        if let Some(details) = self.error_details() {
            body = body.with_details(details);
        }

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail { email } => {
                ApiError::conflict(format!("Email already registered: {}", email))
            }
            StoreError::Backend { message } => ApiError::internal(message),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::not_found("User").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::bad_request("invalid").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthenticated("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::invalid_token("stale").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::forbidden("no access").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::validation("bad field").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::conflict("duplicate").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::not_found("x").error_code(), "NOT_FOUND");
        assert_eq!(
            ApiError::unauthenticated("x").error_code(),
            "UNAUTHENTICATED"
        );
        assert_eq!(ApiError::invalid_token("x").error_code(), "INVALID_TOKEN");
        assert_eq!(ApiError::forbidden("x").error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_invalid_token_and_forbidden_share_status_not_code() {
        let invalid = ApiError::invalid_token("x");
        let forbidden = ApiError::forbidden("x");
        assert_eq!(invalid.status_code(), forbidden.status_code());
        assert_ne!(invalid.error_code(), forbidden.error_code());
    }

    #[test]
    fn test_internal_message_not_exposed() {
        let err = ApiError::internal("connection pool exhausted");
        assert_eq!(err.user_message(), "Server error");
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::duplicate_email("dup@example.com").into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let err: ApiError = StoreError::backend("disk full").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("email", "Invalid email format");
        errors.add("password", "Too short");

        assert!(!errors.is_empty());
        assert_eq!(errors.fields.len(), 2);
    }
}
