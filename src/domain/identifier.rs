//! Short identifiers and their generation.
//!
//! Identifiers are 8 characters drawn uniformly from a 36-character alphabet
//! (`a`-`z`, `0`-`9`), giving roughly 2.8 × 10¹² possible values. Generation
//! only produces candidates; uniqueness among live entries is checked by
//! [`crate::domain::store::ExpiringStore::reserve_identifier`], the only
//! place that can inspect the mapping.

use std::borrow::Borrow;
use std::fmt;

/// Characters an identifier is built from.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Number of characters in every minted identifier.
pub const IDENTIFIER_LENGTH: usize = 8;

/// Largest multiple of the alphabet size that fits in a byte.
///
/// Random bytes at or above this value are discarded so that `byte % 36`
/// stays uniform.
const REJECTION_THRESHOLD: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// An opaque key into the store.
///
/// Minted identifiers always satisfy [`Identifier::is_well_formed`], but an
/// `Identifier` can wrap any string so that arbitrary lookup paths can be
/// queried without a separate parsing step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier has the shape of a minted one.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == IDENTIFIER_LENGTH && self.0.bytes().all(|b| ALPHABET.contains(&b))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Failure of the underlying randomness source.
///
/// Generation never falls back to a weaker source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("random source failed: {0}")]
    RandomSource(String),
}

/// Produces candidate identifiers.
///
/// Implementations must be pure: no bookkeeping of previously returned
/// values, no access to the store.
#[cfg_attr(test, mockall::automock)]
pub trait IdentifierGenerator: Send + Sync {
    /// Mints a fresh candidate identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the random source fails.
    fn mint(&self) -> Result<Identifier, GenerationError>;
}

/// Generator backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureGenerator;

impl SecureGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierGenerator for SecureGenerator {
    fn mint(&self) -> Result<Identifier, GenerationError> {
        let mut out = String::with_capacity(IDENTIFIER_LENGTH);
        let mut buffer = [0u8; 2 * IDENTIFIER_LENGTH];

        while out.len() < IDENTIFIER_LENGTH {
            getrandom::fill(&mut buffer)
                .map_err(|e| GenerationError::RandomSource(e.to_string()))?;

            for byte in buffer {
                if byte >= REJECTION_THRESHOLD {
                    continue;
                }
                out.push(ALPHABET[usize::from(byte) % ALPHABET.len()] as char);
                if out.len() == IDENTIFIER_LENGTH {
                    break;
                }
            }
        }

        Ok(Identifier(out))
    }
}
