//! Auth wire types shared across Atelier crates.
//!
//! Provides `Authorization: Bearer` header parsing and the opaque token format
//! (plaintext validation and the SHA-256 digest used as the storage key).

pub mod bearer;
pub mod token;
