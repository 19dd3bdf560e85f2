/// Unified error taxonomy for the taskcrew core
///
/// Every operation in the engine returns `Result<T, Error>`. All variants are
/// recoverable by the caller: the core never retries internally and no failure
/// is fatal to the process. Aggregation operations fail whole: a partially
/// populated report is never returned.
///
/// # Example
///
/// ```
/// use taskcrew_shared::error::{CoreResult, Error};
///
/// fn check_title(title: &str) -> CoreResult<()> {
///     if title.trim().is_empty() {
///         return Err(Error::validation("title", "title must not be blank"));
///     }
///     Ok(())
/// }
///
/// assert!(check_title("").is_err());
/// ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::task::TaskStatus;
use crate::store::StoreError;

/// Core result type alias
pub type CoreResult<T> = Result<T, Error>;

/// One field-level validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Unified core error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No valid identity assertion was presented
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Identity is valid but role/ownership rules deny the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input failed a field constraint or referenced an unusable entity
    #[error("Validation failed: {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Requested status change is not reachable from the current status
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: TaskStatus,
        to: TaskStatus,
    },

    /// Referenced task/group/principal does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An aggregation scan exceeded its bounded deadline
    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The underlying store could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Builds a single-field validation error
    pub fn validation(field: &str, message: &str) -> Self {
        Error::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    /// Builds a not-found error for an entity kind and id
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} {}", kind, id))
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Error::NotFound(what),
            StoreError::Conflict(what) => Error::Conflict(what),
            StoreError::Unavailable(why) => Error::Unavailable(why),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                details.push(FieldError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        Error::Validation(details)
    }
}

impl From<crate::auth::password::PasswordError> for Error {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        Error::Unavailable(format!("credential hashing failed: {}", err))
    }
}

impl From<crate::auth::token::TokenError> for Error {
    fn from(err: crate::auth::token::TokenError) -> Self {
        Error::Unauthenticated(err.to_string())
    }
}
