//! Error types for fleet operations.
//!
//! Errors are classified by origin:
//! - NotFound / Validation: caller problems, safe to show verbatim
//! - Db / Internal: infrastructure faults, logged and summarized

use thiserror::Error;

use crate::db::DbError;

/// Error type for integration and analytics operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced record does not exist (or is not visible to the caller).
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Caller input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying SQLite failure.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Unexpected internal failure, e.g. a payload that would not encode.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// Returns true when the error describes a caller mistake whose message
    /// can be surfaced in the UI unchanged.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CoreError::NotFound(..) | CoreError::Validation(_))
    }
}

/// Serializable error representation for API responses.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub message: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Internal,
}

impl From<&CoreError> for ApiError {
    fn from(err: &CoreError) -> Self {
        let kind = match err {
            CoreError::NotFound(..) => ErrorKind::NotFound,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Db(_) | CoreError::Internal(_) => ErrorKind::Internal,
        };
        let message = if err.is_user_facing() {
            err.to_string()
        } else {
            "Something went wrong on our side. Try again shortly.".to_string()
        };
        ApiError { message, kind }
    }
}
