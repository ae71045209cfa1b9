//! Input Validators
//!
//! Pure checks that run before any value reaches a query. Required fields and
//! optional search filters have separate entry points: a blank required field is
//! an error, a blank filter simply means "not supplied".

use crate::error::ValidationError;

/// Default upper bound (exclusive) for relationship-type tokens.
pub const MAX_TOKEN_LENGTH: usize = 20;

/// Require a value that is present and not blank.
///
/// # Errors
/// Returns `ValidationError::MissingField` if the value is absent, empty or
/// whitespace-only.
pub fn require_non_empty<'a>(
    value: Option<&'a str>,
    field: &str,
) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::missing_field(field)),
    }
}

/// Require a short identifier token made of `[A-Za-z0-9_]` only.
///
/// Tokens accepted here are written into query text as-is, so nothing is
/// trimmed or rewritten: any disallowed character rejects the whole value.
///
/// # Errors
/// - `MissingField` if absent, empty or whitespace-only
/// - `TooLong` if `len >= max_length`
/// - `IllegalCharacters` if any character is outside `[A-Za-z0-9_]`
pub fn require_token<'a>(
    value: Option<&'a str>,
    field: &str,
    max_length: usize,
) -> Result<&'a str, ValidationError> {
    let token = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(ValidationError::missing_field(field)),
    };

    let length = token.chars().count();
    if length >= max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            length,
            max_length,
        });
    }

    if !token.chars().all(is_token_char) {
        return Err(ValidationError::IllegalCharacters {
            field: field.to_string(),
        });
    }

    Ok(token)
}

/// Normalize an optional search filter. Absent and blank values are both `None`.
pub fn optional_filter(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
