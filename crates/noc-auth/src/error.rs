//! Token and password errors.

use thiserror::Error;

/// Failure of a token or password primitive.
///
/// The account service turns these into audit reasons and a single
/// caller-facing "invalid token" outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token signature does not verify")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    InvalidToken(String),

    /// Anything other than RS256.
    #[error("Token algorithm not accepted")]
    InvalidAlgorithm,

    #[error("Token lacks claim `{0}`")]
    MissingClaim(String),

    /// A refresh token presented as an access token, or the reverse.
    #[error("Token purpose mismatch: wanted {expected}, got {actual}")]
    WrongPurpose { expected: String, actual: String },

    #[error("Could not hash password: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is not a PHC string")]
    InvalidHashFormat,

    #[error("Unusable RSA key ({0})")]
    InvalidKey(String),
}

impl AuthError {
    /// Whether the token itself was rejected, as opposed to a local
    /// key or hashing problem.
    #[must_use]
    pub fn is_token_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::HashingFailed(_) | AuthError::InvalidHashFormat | AuthError::InvalidKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
        assert_eq!(
            AuthError::WrongPurpose {
                expected: "access".to_string(),
                actual: "refresh".to_string(),
            }
            .to_string(),
            "Token purpose mismatch: wanted access, got refresh"
        );
        assert_eq!(
            AuthError::MissingClaim("exp".to_string()).to_string(),
            "Token lacks claim `exp`"
        );
    }

    #[test]
    fn test_token_rejection() {
        assert!(AuthError::TokenExpired.is_token_rejection());
        assert!(AuthError::InvalidSignature.is_token_rejection());
        assert!(AuthError::WrongPurpose {
            expected: "access".to_string(),
            actual: "refresh".to_string(),
        }
        .is_token_rejection());
        assert!(!AuthError::InvalidKey("pem".to_string()).is_token_rejection());
        assert!(!AuthError::InvalidHashFormat.is_token_rejection());
    }
}
