//! # User Errors
//!
//! Error types for the user repository.

use thiserror::Error;

use super::model::UserId;

/// Result type for repository operations
pub type UserResult<T> = Result<T, UserError>;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// No record carries the requested id
    #[error("User with id {0} not found")]
    NotFound(UserId),

    /// The backing collection could not be accessed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserError {
    pub(crate) fn lock_poisoned() -> Self {
        UserError::Internal("Lock poisoned".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }
}
