//! Error Types for AssetGraph API
//!
//! This module defines error handling for the HTTP layer:
//! - ErrorCode enum for categorizing errors
//! - ApiError struct for structured error responses
//! - IntoResponse implementation for Axum HTTP responses
//! - Conversions from the core validation and storage errors
//!
//! All errors are serialized as JSON `{code, message, details?}`.

use assetgraph_core::{AssetGraphError, StorageError, ValidationError};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to one HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body or query string could not be decoded
    InvalidInput,

    /// Required field is missing or blank
    MissingField,

    /// Field value does not parse
    InvalidFormat,

    /// Token is too long
    TooLong,

    /// Token contains characters outside `[A-Za-z0-9_]`
    IllegalCharacters,

    /// Search supplied no criteria
    NoSearchCriteria,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Store rejected or failed the operation
    DatabaseError,

    /// Store could not be reached
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat
            | ErrorCode::TooLong
            | ErrorCode::IllegalCharacters
            | ErrorCode::NoSearchCriteria => StatusCode::BAD_REQUEST,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::TooLong => "Value is too long",
            ErrorCode::IllegalCharacters => "Value contains illegal characters",
            ErrorCode::NoSearchCriteria => "At least one search criterion is required",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending field, expected format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        match err {
            ValidationError::MissingField { field } => Self::new(ErrorCode::MissingField, message)
                .with_details(serde_json::json!({ "field": field })),
            ValidationError::BadFormat { field, expected } => {
                Self::new(ErrorCode::InvalidFormat, message)
                    .with_details(serde_json::json!({ "field": field, "expected": expected }))
            }
            ValidationError::TooLong {
                field,
                length,
                max_length,
            } => Self::new(ErrorCode::TooLong, message).with_details(serde_json::json!({
                "field": field,
                "length": length,
                "maxLength": max_length,
            })),
            ValidationError::IllegalCharacters { field } => {
                Self::new(ErrorCode::IllegalCharacters, message)
                    .with_details(serde_json::json!({ "field": field }))
            }
            ValidationError::NoSearchCriteria => Self::new(ErrorCode::NoSearchCriteria, message),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error");
        let code = match err {
            StorageError::ConnectionFailed { .. } => ErrorCode::ServiceUnavailable,
            _ => ErrorCode::DatabaseError,
        };
        Self::new(code, format!("{}: {}", code.default_message(), err))
    }
}

impl From<AssetGraphError> for ApiError {
    fn from(err: AssetGraphError) -> Self {
        match err {
            AssetGraphError::Validation(e) => e.into(),
            AssetGraphError::Storage(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
