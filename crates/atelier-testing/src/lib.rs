//! Test utilities for Atelier services.
//!
//! Provides bearer header helpers and SQLite stores built by the production
//! migrations. Use from dev-dependencies only.

pub mod auth;
pub mod db;
