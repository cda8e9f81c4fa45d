//! Service plumbing shared by Atelier binaries: env config, health checks,
//! request ids, tracing setup and response serialisation helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
