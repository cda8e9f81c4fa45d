//! Credential Store: salted Argon2id password hashing.
//!
//! Length limits are checked before any hashing work so oversized input cannot
//! be used to burn CPU. Hashing and verification run on the blocking pool.

use anyhow::Context as _;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::types::StoredCredential;
use crate::error::StoreServiceError;

/// Upper bound on password input, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Lower bound applied when a user chooses a password.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Well-formed Argon2id PHC string with the default cost parameters. Its
/// digest is all zero bytes, so no password matches it.
const DECOY_CREDENTIAL: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("password must not be empty")]
    Empty,
    #[error("password must not exceed 72 bytes")]
    TooLong,
    #[error("password must be at least 8 characters")]
    TooShort,
}

/// Reject input that may not be hashed at all.
pub fn check_bounds(plaintext: &str) -> Result<(), CredentialError> {
    if plaintext.is_empty() {
        return Err(CredentialError::Empty);
    }
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(CredentialError::TooLong);
    }
    Ok(())
}

/// `check_bounds` plus the minimum length for newly chosen passwords.
pub fn check_new_password(plaintext: &str) -> Result<(), CredentialError> {
    check_bounds(plaintext)?;
    if plaintext.chars().count() < MIN_PASSWORD_CHARS {
        return Err(CredentialError::TooShort);
    }
    Ok(())
}

/// Hash a password into a PHC string.
pub async fn set(plaintext: &str) -> Result<StoredCredential, StoreServiceError> {
    check_bounds(plaintext)?;
    let plaintext = plaintext.to_owned();
    let phc = tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow::anyhow!("argon2: {e}"))
    })
    .await
    .context("join password hashing task")??;
    Ok(StoredCredential(phc))
}

/// Verify a password against a stored credential.
///
/// Out-of-bounds input and unparsable stored values never match. The digest
/// comparison inside `argon2` is constant-time.
pub async fn matches(
    stored: &StoredCredential,
    plaintext: &str,
) -> Result<bool, StoreServiceError> {
    if check_bounds(plaintext).is_err() {
        return Ok(false);
    }
    let stored = stored.as_str().to_owned();
    let plaintext = plaintext.to_owned();
    let ok = tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&stored) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .context("join password verification task")?;
    Ok(ok)
}

/// Run one full verification against a credential nobody holds.
///
/// Used where no stored credential exists, so the caller still spends the
/// same work as [`matches`] would.
pub async fn verify_decoy(plaintext: &str) -> Result<(), StoreServiceError> {
    matches(&StoredCredential(DECOY_CREDENTIAL.to_owned()), plaintext).await?;
    Ok(())
}
