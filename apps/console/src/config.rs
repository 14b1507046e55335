use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::guard::GuardConfig;

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Client configuration loaded from environment variables. Command-line flags
/// override these after loading.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    /// File holding the token, read in the background at startup.
    pub token_file: Option<PathBuf>,
    pub retry_base: Duration,
    pub auth_wait: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: std::env::var("JOBASSIST_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: std::env::var("JOBASSIST_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            token_file: std::env::var("JOBASSIST_TOKEN_FILE").ok().map(PathBuf::from),
            retry_base: Duration::from_millis(env_millis("JOBASSIST_RETRY_BASE_MS", 1000)?),
            auth_wait: Duration::from_millis(env_millis("JOBASSIST_AUTH_WAIT_MS", 5000)?),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        })
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            base_url: self.api_url.clone(),
            retry_base: self.retry_base,
            auth_wait: self.auth_wait,
        }
    }
}

fn env_millis(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(v) => parse_millis(key, &v),
        Err(_) => Ok(default),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a number of milliseconds, got '{value}'"))
}
