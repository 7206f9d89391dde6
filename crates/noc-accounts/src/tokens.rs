//! Password reset tokens.
//!
//! The secret goes to the user once; the account keeps only its SHA-256.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Entropy per reset token.
pub const RESET_TOKEN_BYTES: usize = 32;

/// A freshly minted reset token.
#[derive(Clone)]
pub struct ResetToken {
    secret: String,
    hash: String,
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

impl ResetToken {
    /// Draw a token from the OS RNG, encoded as unpadded URL-safe base64.
    #[must_use]
    pub fn generate() -> Self {
        let mut raw = [0u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut raw);
        let secret = URL_SAFE_NO_PAD.encode(raw);
        let hash = hash_token(&secret);
        Self { secret, hash }
    }

    /// Value handed to the user.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Value stored on the account.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// `(secret, hash)`
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.secret, self.hash)
    }
}

/// Lowercase hex SHA-256 of `token`.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Whether `presented` hashes to `stored_hash`, compared in constant time.
#[must_use]
pub fn token_matches(presented: &str, stored_hash: &str) -> bool {
    let presented = hash_token(presented);
    presented.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
