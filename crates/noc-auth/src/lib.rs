//! Token and password primitives for the NOC engine.
//!
//! - [`JwtTokenIssuer`]: RS256 access/refresh tokens, expiry checked
//!   against a caller-supplied instant
//! - [`PasswordHasher`]: Argon2id with OWASP parameters
//!
//! # Example
//!
//! ```rust,ignore
//! use noc_auth::{JwtTokenIssuer, TokenIssuer, TokenPurpose};
//!
//! let issuer = JwtTokenIssuer::new(private_pem, public_pem, "noc")?;
//! let issued = issuer.issue_refresh(user_id, clock.now())?;
//! let claims = issuer.verify(&issued.token, TokenPurpose::Refresh, clock.now())?;
//! ```

mod claims;
mod error;
mod issuer;
mod jwt;
mod password;

pub use claims::{JwtClaims, TokenPurpose};
pub use error::AuthError;
pub use issuer::{AccessSubject, IssuedToken, JwtTokenIssuer, TokenIssuer};
pub use jwt::RsaKeyPair;
pub use password::{hash_password, verify_password, PasswordHasher};
