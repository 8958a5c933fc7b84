//! Centralized configuration (environment variables + defaults).

use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SEED_KEY: &str = "seed-me";
const DEFAULT_API_KEY_TTL_SECS: u64 = 31_536_000;

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Address the API server listens on.
pub fn bind_addr() -> String {
    non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

/// Postgres URL. When unset the server keeps everything in memory.
pub fn database_url() -> Option<String> {
    non_empty_var("DATABASE_URL")
}

/// Bearer secret that unlocks `POST /api/seed`.
pub fn seed_key() -> String {
    non_empty_var("SEED_KEY").unwrap_or_else(|| DEFAULT_SEED_KEY.to_string())
}

/// Lifetime of stored API key metadata.
pub fn api_key_ttl() -> Duration {
    let secs = non_empty_var("API_KEY_TTL_SECS")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_API_KEY_TTL_SECS)
        .max(1);
    Duration::from_secs(secs)
}

/// Settings the naming service needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub seed_key: String,
    pub api_key_ttl: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            seed_key: seed_key(),
            api_key_ttl: api_key_ttl(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            seed_key: DEFAULT_SEED_KEY.to_string(),
            api_key_ttl: Duration::from_secs(DEFAULT_API_KEY_TTL_SECS),
        }
    }
}
