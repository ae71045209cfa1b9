//! Error types for AssetGraph operations

use thiserror::Error;

/// Caller-input errors. Raised before any query text is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Field {field} is too long: {length} characters, must be shorter than {max_length}")]
    TooLong {
        field: String,
        length: usize,
        max_length: usize,
    },

    #[error("Field {field} contains characters outside [A-Za-z0-9_]")]
    IllegalCharacters { field: String },

    #[error("Invalid format for {field}: expected {expected}")]
    BadFormat { field: String, expected: String },

    #[error("At least one search criterion must be supplied")]
    NoSearchCriteria,
}

impl ValidationError {
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub fn bad_format(field: &str, expected: &str) -> Self {
        Self::BadFormat {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Storage layer errors.
///
/// Carries the driver's own message so callers see the failure as the store reported it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Could not decode column {column}: {reason}")]
    DecodeFailed { column: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all AssetGraph errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetGraphError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for AssetGraph operations.
pub type AssetGraphResult<T> = Result<T, AssetGraphError>;

// =============================================================================
// TESTS
// =============================================================================
