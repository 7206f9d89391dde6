//! Token issuing and verification against an injected clock.

use crate::claims::{JwtClaims, TokenPurpose};
use crate::error::AuthError;
use crate::jwt::RsaKeyPair;
use chrono::{DateTime, Duration, Utc};
use noc_core::UserId;

/// Identity embedded in an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSubject {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// A signed token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and checks access/refresh tokens.
///
/// `now` is always supplied by the caller so that expiry follows the
/// service's [`noc_core::Clock`].
pub trait TokenIssuer: Send + Sync {
    /// Issue a short-lived access token carrying the account identity.
    fn issue_access(
        &self,
        subject: &AccessSubject,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError>;

    /// Issue a long-lived refresh token carrying the account id only.
    fn issue_refresh(&self, user_id: UserId, now: DateTime<Utc>)
        -> Result<IssuedToken, AuthError>;

    /// Check signature, issuer, purpose and expiry; return the claims.
    fn verify(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, AuthError>;
}

/// RS256 [`TokenIssuer`] backed by a PEM key pair.
#[derive(Debug, Clone)]
pub struct JwtTokenIssuer {
    keys: RsaKeyPair,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    leeway_secs: u64,
}

impl JwtTokenIssuer {
    /// Access tokens live 24 hours, refresh tokens 7 days, 60s leeway.
    ///
    /// Fails with [`AuthError::InvalidKey`] if either PEM does not parse.
    pub fn new(
        private_key_pem: &[u8],
        public_key_pem: &[u8],
        issuer: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            keys: RsaKeyPair::from_pem(private_key_pem, public_key_pem)?,
            issuer: issuer.into(),
            access_ttl: Duration::hours(24),
            refresh_ttl: Duration::days(7),
            leeway_secs: 60,
        })
    }

    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_access(
        &self,
        subject: &AccessSubject,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.access_ttl;
        let claims = JwtClaims::access(
            &subject.user_id.to_string(),
            &self.issuer,
            now.timestamp(),
            expires_at.timestamp(),
            &subject.username,
            &subject.email,
            &subject.role,
        );

        Ok(IssuedToken {
            token: self.keys.sign(&claims)?,
            expires_at,
        })
    }

    fn issue_refresh(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = now + self.refresh_ttl;
        let claims = JwtClaims::refresh(
            &user_id.to_string(),
            &self.issuer,
            now.timestamp(),
            expires_at.timestamp(),
        );

        Ok(IssuedToken {
            token: self.keys.sign(&claims)?,
            expires_at,
        })
    }

    fn verify(
        &self,
        token: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, AuthError> {
        let claims = self.keys.open(token, &self.issuer)?;

        if claims.purpose != purpose {
            tracing::debug!(
                expected = %purpose,
                actual = %claims.purpose,
                "Token presented for the wrong purpose"
            );
            return Err(AuthError::WrongPurpose {
                expected: purpose.to_string(),
                actual: claims.purpose.to_string(),
            });
        }

        if claims.is_expired_at(now, self.leeway_secs) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
