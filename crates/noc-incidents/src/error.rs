//! Error types for incident operations.

use noc_authorization::AccessError;
use noc_core::NocError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IncidentError {
    #[error("Incident not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Escalation levels never go down.
    #[error("Escalation level cannot decrease from {current} to {requested}")]
    EscalationDowngrade { current: u32, requested: u32 },

    #[error(transparent)]
    Repository(NocError),

    #[error(transparent)]
    Access(#[from] AccessError),
}

impl From<NocError> for IncidentError {
    fn from(err: NocError) -> Self {
        match err {
            NocError::ValidationError { field, message } => {
                Self::Validation(format!("{field}: {message}"))
            }
            other => Self::Repository(other),
        }
    }
}

impl From<validator::ValidationErrors> for IncidentError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
