//! Opaque bearer token format.
//!
//! A token is [`TOKEN_LENGTH`] characters from the RFC 4648 base32 alphabet
//! (130 bits of entropy). Only its SHA-256 [`TokenDigest`] is ever persisted;
//! lookups always go through the digest, never through plaintext comparison.

use std::fmt;

use sha2::{Digest, Sha256};

/// Plaintext length in characters.
pub const TOKEN_LENGTH: usize = 26;

/// RFC 4648 base32 alphabet, no padding.
pub const TOKEN_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenFormatError {
    #[error("token must be 26 characters, got {0}")]
    Length(usize),
    #[error("token contains characters outside the base32 alphabet")]
    Charset,
}

/// Check a presented plaintext before any storage lookup.
pub fn validate_plaintext(plaintext: &str) -> Result<(), TokenFormatError> {
    if plaintext.len() != TOKEN_LENGTH {
        return Err(TokenFormatError::Length(plaintext.len()));
    }
    if !plaintext.bytes().all(|b| TOKEN_ALPHABET.contains(&b)) {
        return Err(TokenFormatError::Charset);
    }
    Ok(())
}

/// SHA-256 of a token plaintext. This is the `tokens.digest` primary key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    pub fn of(plaintext: &str) -> Self {
        Self(Sha256::digest(plaintext.as_bytes()).into())
    }

    /// Rebuild from stored bytes. Returns `None` if the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

// Digests are lookup keys; keep them out of logs.
impl fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenDigest(..)")
    }
}
