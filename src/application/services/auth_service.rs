//! Authentication of link-creation requests against a shared secret.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Checks presented tokens against the configured SHA-256 digest.
///
/// Only the digest is held in memory. The comparison of hex digests is
/// constant-time; their length is public.
pub struct AuthService {
    expected_digest: String,
}

impl AuthService {
    /// Creates the service from a hex-encoded SHA-256 digest (any case).
    pub fn new(token_sha256: impl Into<String>) -> Self {
        Self {
            expected_digest: token_sha256.into().to_ascii_lowercase(),
        }
    }

    /// Lowercase hex SHA-256 of `token`.
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn verify(&self, token: &str) -> bool {
        let presented = Self::hash_token(token);
        presented
            .as_bytes()
            .ct_eq(self.expected_digest.as_bytes())
            .into()
    }

    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] when the token is missing or wrong.
    pub fn authenticate(&self, token: Option<&str>) -> Result<(), AppError> {
        match token {
            Some(token) if self.verify(token) => Ok(()),
            Some(_) => {
                tracing::warn!("Rejected request with invalid token");
                Err(AppError::forbidden())
            }
            None => {
                tracing::warn!("Rejected request without token");
                Err(AppError::forbidden())
            }
        }
    }
}
