//! Error Types
//!
//! Shared error type used by the collaborator traits (repositories, sinks)
//! across the NOC crates.
//!
//! # Example
//!
//! ```
//! use noc_core::{NocError, Result};
//!
//! fn find_incident(number: &str) -> Result<String> {
//!     if number.is_empty() {
//!         return Err(NocError::NotFound {
//!             resource: "Incident".to_string(),
//!             id: None,
//!         });
//!     }
//!     Ok(format!("Incident {}", number))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for the NOC engine.
///
/// # Variants
///
/// - `Unauthorized` - Authentication/authorization failure
/// - `NotFound` - Resource not found
/// - `ValidationError` - Input validation failure
/// - `Conflict` - Uniqueness violation (duplicate username, incident number)
/// - `Repository` - Storage backend failure
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NocError {
    /// Authentication or authorization failure.
    #[error("Unauthorized{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized {
        /// Optional message providing more context
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// Requested resource was not found.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "Incident", "User")
        resource: String,
        /// Optional identifier of the resource
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    #[error("Validation error on field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// A unique value is already taken.
    #[error("Conflict on '{field}': {message}")]
    Conflict {
        /// The field holding the duplicate value
        field: String,
        /// Description of the conflict
        message: String,
    },

    /// The storage backend failed.
    ///
    /// Never retried by the services; propagated to the caller as is.
    #[error("Repository error: {message}")]
    Repository {
        /// Backend error description
        message: String,
    },
}

impl NocError {
    /// Shorthand for a repository failure.
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Shorthand for a validation failure on one field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Type alias for Results using `NocError`.
pub type Result<T> = std::result::Result<T, NocError>;
