//! Error types for access checks.

use crate::resource::ResourceType;
use noc_core::NocError;
use thiserror::Error;

/// Outcome of a refused access check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No authenticated actor on the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The actor lacks the role, permission or ownership required.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// The resource named in the check does not exist.
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: ResourceType,
        id: String,
    },

    /// The actor exceeded the request window.
    #[error("Rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: std::time::Duration },

    /// The resource lookup failed.
    #[error(transparent)]
    Repository(#[from] NocError),
}

impl AccessError {
    /// Whether the error is an expected refusal rather than a backend failure.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        !matches!(self, AccessError::Repository(_))
    }
}
