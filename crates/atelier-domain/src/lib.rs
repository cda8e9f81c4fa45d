//! Domain types shared across Atelier crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod access;
pub mod id;
pub mod user;
