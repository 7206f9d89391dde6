//! RS256 key material and the signature step.
//!
//! Keys are parsed once when the pair is loaded. Expiry is not checked here:
//! [`crate::JwtTokenIssuer`] compares `exp` against the caller's clock.

use std::fmt;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::JwtClaims;
use crate::error::AuthError;

/// A parsed RSA signing/verification pair.
#[derive(Clone)]
pub struct RsaKeyPair {
    signing: EncodingKey,
    verifying: DecodingKey,
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RsaKeyPair(..)")
    }
}

impl RsaKeyPair {
    /// Parse a PKCS#8 private key and SPKI public key, both PEM encoded.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, AuthError> {
        let signing = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| AuthError::InvalidKey(format!("private key: {e}")))?;
        let verifying = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| AuthError::InvalidKey(format!("public key: {e}")))?;

        Ok(Self { signing, verifying })
    }

    /// Sign `claims` as a compact JWS.
    pub fn sign(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &self.signing)
            .map_err(|e| AuthError::InvalidToken(format!("signing failed: {e}")))
    }

    /// Check the signature and issuer of `token` and return its claims.
    ///
    /// `exp` must be present but is not compared with any clock here.
    pub fn open(&self, token: &str, issuer: &str) -> Result<JwtClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);

        jsonwebtoken::decode::<JwtClaims>(token, &self.verifying, &validation)
            .map(|data| data.claims)
            .map_err(classify)
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::InvalidAlgorithm
        }
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
        ErrorKind::InvalidIssuer => AuthError::InvalidToken("issuer mismatch".to_string()),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
            AuthError::InvalidToken("not a compact JWS".to_string())
        }
        ErrorKind::Json(_) => AuthError::InvalidToken("claims do not match".to_string()),
        _ => AuthError::InvalidToken(err.to_string()),
    }
}
