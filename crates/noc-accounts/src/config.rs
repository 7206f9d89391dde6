//! Account service configuration from the environment.

use chrono::Duration;
use noc_auth::{AuthError, JwtTokenIssuer};
use noc_core::config::{bounded_duration, parsed_or, process_env, required};
use noc_core::ConfigError;

use crate::lockout::{LockoutPolicy, DEFAULT_LOCK_MINUTES, DEFAULT_MAX_ATTEMPTS};

pub const DEFAULT_ISSUER: &str = "noc";
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 24 * 60;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

const MINUTES_PER_YEAR: i64 = 365 * 24 * 60;
const MAX_REFRESH_TTL_DAYS: i64 = 365;

/// Settings for [`crate::AuthenticationService`] and its token issuer.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_private_key: String,
    pub jwt_public_key: String,
    pub jwt_issuer: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub lockout: LockoutPolicy,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_private_key", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("lockout", &self.lockout)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// # Required
    ///
    /// - `JWT_PRIVATE_KEY` - RS256 private key (PEM)
    /// - `JWT_PUBLIC_KEY` - RS256 public key (PEM)
    ///
    /// # Optional
    ///
    /// - `JWT_ISSUER` (default `noc`)
    /// - `ACCESS_TOKEN_TTL_MINUTES` (default 1440)
    /// - `REFRESH_TOKEN_TTL_DAYS` (default 7)
    /// - `LOCKOUT_MAX_ATTEMPTS` (default 5)
    /// - `LOCKOUT_DURATION_MINUTES` (default 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup<L>(lookup: &L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let jwt_private_key = pem(lookup, "JWT_PRIVATE_KEY")?;
        let jwt_public_key = pem(lookup, "JWT_PUBLIC_KEY")?;
        let jwt_issuer = parsed_or(lookup, "JWT_ISSUER", DEFAULT_ISSUER.to_string())?;

        let access_token_ttl = bounded_duration(
            lookup,
            "ACCESS_TOKEN_TTL_MINUTES",
            DEFAULT_ACCESS_TTL_MINUTES,
            MINUTES_PER_YEAR,
            Duration::minutes,
        )?;
        let refresh_token_ttl = bounded_duration(
            lookup,
            "REFRESH_TOKEN_TTL_DAYS",
            DEFAULT_REFRESH_TTL_DAYS,
            MAX_REFRESH_TTL_DAYS,
            Duration::days,
        )?;
        let max_attempts = parsed_or(lookup, "LOCKOUT_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(invalid("LOCKOUT_MAX_ATTEMPTS", "must be at least 1"));
        }
        let lock_duration = bounded_duration(
            lookup,
            "LOCKOUT_DURATION_MINUTES",
            DEFAULT_LOCK_MINUTES,
            MINUTES_PER_YEAR,
            Duration::minutes,
        )?;

        Ok(Self {
            jwt_private_key,
            jwt_public_key,
            jwt_issuer,
            access_token_ttl,
            refresh_token_ttl,
            lockout: LockoutPolicy::new(max_attempts, lock_duration),
        })
    }

    /// Build the RS256 issuer these settings describe.
    ///
    /// Fails if either key does not parse as RSA PEM.
    pub fn token_issuer(&self) -> Result<JwtTokenIssuer, AuthError> {
        Ok(JwtTokenIssuer::new(
            self.jwt_private_key.as_bytes(),
            self.jwt_public_key.as_bytes(),
            self.jwt_issuer.clone(),
        )?
        .with_access_ttl(self.access_token_ttl)
        .with_refresh_ttl(self.refresh_token_ttl))
    }
}

fn invalid(var: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        message: message.to_string(),
    }
}

fn pem<L>(lookup: &L, var: &str) -> Result<String, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    // Single-line env values often carry escaped newlines.
    let value = required(lookup, var)?.replace("\\n", "\n");
    if !value.contains("-----BEGIN") {
        return Err(invalid(var, "Must be PEM format (should contain -----BEGIN)"));
    }
    Ok(value)
}
