//! Error types for decorated operations
//!
//! A decorated operation fails with a [`CallError`], which is either the
//! operation's own [`OperationError`] (passed through untouched) or a
//! [`ValidationError`] raised before the operation ran.
//!
//! # Error Codes
//!
//! Operation failures carry an [`ErrorCode`]. When serialized, codes are
//! converted to SCREAMING_SNAKE_CASE strings.
//!
//! # Example
//! ```rust,ignore
//! use service_trace::{OperationError, ErrorCode};
//!
//! let error = OperationError::new(ErrorCode::NotFound, "User not found");
//! let error = OperationError::not_found("User not found"); // Convenience method
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// The arguments were well-formed but semantically wrong
    BadRequest,
    /// The requested resource or operation was not found
    NotFound,
    /// The request conflicts with current state
    Conflict,
    /// The caller is not allowed to perform the operation
    Forbidden,
    /// An unexpected internal error occurred
    InternalError,
    /// The requested functionality is not implemented
    NotImplemented,
    /// A downstream dependency is unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::InternalError => "INTERNAL_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure reported by an operation itself.
///
/// The decorator never rewrites these; the caller gets back exactly what
/// the operation returned.
///
/// # Example
/// ```rust,ignore
/// let error = OperationError::conflict("email already registered")
///     .with_details(serde_json::json!({"email": "a@b.c"}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct OperationError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl OperationError {
    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Create a BAD_REQUEST error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a NOT_FOUND error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a CONFLICT error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create a FORBIDDEN error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create an INTERNAL_ERROR error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create the error returned for an unknown operation name.
    pub fn operation_not_found(service: &str, name: &str) -> Self {
        Self::not_found(format!("Operation '{}' not found on service '{}'", name, service))
    }
}

/// Schema violation for a single argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending argument
    pub field: String,
    /// Human-readable description of the violated constraint
    pub message: String,
    /// Machine-readable constraint identifier
    pub code: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// The argument is missing.
    pub fn required(field: &str) -> Self {
        Self::new(field, format!("\"{}\" is required", field), "required")
    }

    /// The argument has the wrong type and could not be coerced.
    pub fn wrong_type(field: &str, expected: &str) -> Self {
        let article = if expected.starts_with(['a', 'e', 'i', 'o', 'u']) {
            "an"
        } else {
            "a"
        };
        Self::new(
            field,
            format!("\"{}\" must be {} {}", field, article, expected),
            format!("{}.base", expected),
        )
    }

    /// The argument is below the minimum.
    pub fn min(field: &str, min: f64) -> Self {
        Self::new(
            field,
            format!("\"{}\" must be greater than or equal to {}", field, min),
            "min",
        )
    }

    /// The argument is above the maximum.
    pub fn max(field: &str, max: f64) -> Self {
        Self::new(
            field,
            format!("\"{}\" must be less than or equal to {}", field, max),
            "max",
        )
    }

    /// The text argument is too short.
    pub fn min_length(field: &str, min: usize) -> Self {
        Self::new(
            field,
            format!("\"{}\" length must be at least {} characters long", field, min),
            "min_length",
        )
    }

    /// The text argument is too long.
    pub fn max_length(field: &str, max: usize) -> Self {
        Self::new(
            field,
            format!(
                "\"{}\" length must be less than or equal to {} characters long",
                field, max
            ),
            "max_length",
        )
    }

    /// The text argument does not match the pattern.
    pub fn pattern(field: &str, pattern: &str) -> Self {
        Self::new(
            field,
            format!("\"{}\" must match pattern: {}", field, pattern),
            "pattern",
        )
    }

    /// The argument is not one of the allowed values.
    pub fn one_of(field: &str, allowed: &[String]) -> Self {
        Self::new(
            field,
            format!("\"{}\" must be one of [{}]", field, allowed.join(", ")),
            "one_of",
        )
    }
}

/// Error returned by every decorated (and undecorated) operation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Arguments were rejected before the operation ran.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The operation itself failed.
    #[error(transparent)]
    Operation(#[from] OperationError),
}

impl CallError {
    /// Returns the validation failure, if that is what this is.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Operation(_) => None,
        }
    }

    /// Returns the operation failure, if that is what this is.
    pub fn as_operation(&self) -> Option<&OperationError> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Validation(_) => None,
        }
    }

    /// Returns true for validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result of a call.
pub type CallResult<T = crate::Value> = Result<T, CallError>;
