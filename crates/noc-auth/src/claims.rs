//! Claims carried by NOC access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Presented on every request.
    Access,
    /// Exchanged for a new pair.
    Refresh,
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
        })
    }
}

/// Token payload.
///
/// `sub` is the account id. Access tokens also carry the username, email
/// and role name so that downstream services can authorize without a
/// lookup; refresh tokens carry the id only.
///
/// ```rust
/// use noc_auth::{JwtClaims, TokenPurpose};
///
/// let claims = JwtClaims::refresh("6f1f0a8e-1b47-4c53-9c55-2f0f3c3b8c11", "noc", 0, 604_800);
/// assert_eq!(claims.purpose, TokenPurpose::Refresh);
/// assert!(claims.role.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token.
    pub jti: String,
    pub purpose: TokenPurpose,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl JwtClaims {
    fn base(sub: &str, iss: &str, iat: i64, exp: i64, purpose: TokenPurpose) -> Self {
        Self {
            sub: sub.to_string(),
            iss: iss.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            purpose,
            username: None,
            email: None,
            role: None,
        }
    }

    /// Refresh claims: account id only.
    #[must_use]
    pub fn refresh(sub: &str, iss: &str, iat: i64, exp: i64) -> Self {
        Self::base(sub, iss, iat, exp, TokenPurpose::Refresh)
    }

    /// Access claims with the account identity attached.
    #[must_use]
    pub fn access(
        sub: &str,
        iss: &str,
        iat: i64,
        exp: i64,
        username: &str,
        email: &str,
        role: &str,
    ) -> Self {
        Self {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            role: Some(role.to_string()),
            ..Self::base(sub, iss, iat, exp, TokenPurpose::Access)
        }
    }

    /// Past `exp` at `now`, after allowing `leeway_secs` of clock skew.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: u64) -> bool {
        let leeway = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
        now.timestamp() > self.exp.saturating_add(leeway)
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
