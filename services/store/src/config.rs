use serde::Deserialize;

use atelier_core::config::Config;

/// Store service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on. Env var: `STORE_PORT`.
    #[serde(default = "default_port")]
    pub store_port: u16,
    #[serde(default = "default_auth_ttl")]
    pub auth_token_ttl_secs: i64,
    #[serde(default = "default_activation_ttl")]
    pub activation_token_ttl_secs: i64,
    #[serde(default = "default_password_reset_ttl")]
    pub password_reset_token_ttl_secs: i64,
    /// Period of the expired-token sweep.
    #[serde(default = "default_sweep_interval")]
    pub token_sweep_interval_secs: u64,
    /// Balance credited to every newly registered user.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: i64,
    /// When true, a purchase may drive the balance below zero.
    #[serde(default)]
    pub allow_overdraft: bool,
}

impl Config for StoreConfig {}

fn default_port() -> u16 {
    4000
}

fn default_auth_ttl() -> i64 {
    24 * 60 * 60
}

fn default_activation_ttl() -> i64 {
    3 * 24 * 60 * 60
}

fn default_password_reset_ttl() -> i64 {
    45 * 60
}

fn default_sweep_interval() -> u64 {
    60 * 60
}

fn default_initial_balance() -> i64 {
    100_000
}
