//! Error types for account operations.

use chrono::{DateTime, Utc};
use noc_auth::AuthError;
use noc_core::NocError;
use thiserror::Error;

/// Account operation errors.
///
/// `InvalidCredentials` covers both unknown identifiers and
/// wrong passwords.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked until {locked_until}")]
    AccountLocked { locked_until: DateTime<Utc> },

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict on '{field}': {message}")]
    Conflict { field: String, message: String },

    #[error(transparent)]
    Repository(NocError),

    #[error("Authentication primitive failed: {0}")]
    Auth(#[from] AuthError),
}

impl From<NocError> for AccountError {
    fn from(err: NocError) -> Self {
        match err {
            NocError::Conflict { field, message } => Self::Conflict { field, message },
            NocError::ValidationError { field, message } => {
                Self::Validation(format!("{field}: {message}"))
            }
            other => Self::Repository(other),
        }
    }
}

impl From<validator::ValidationErrors> for AccountError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
