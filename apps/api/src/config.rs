use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Single user every authenticated request is attributed to until real
/// identities exist.
pub const DEFAULT_USER_ID: &str = "12345678-1234-5678-1234-567812345678";
const DEFAULT_UPLOAD_FOLDER: &str = "./filestore";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_folder: PathBuf,
    pub mock_user_id: Uuid,
    pub run_migrations: bool,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            upload_folder: std::env::var("UPLOAD_FOLDER")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_FOLDER.to_string())
                .into(),
            mock_user_id: std::env::var("MOCK_USER_ID")
                .unwrap_or_else(|_| DEFAULT_USER_ID.to_string())
                .parse::<Uuid>()
                .context("MOCK_USER_ID must be a UUID")?,
            run_migrations: parse_flag(std::env::var("RUN_MIGRATIONS").ok().as_deref()),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
impl Config {
    pub fn for_tests(upload_folder: PathBuf) -> Self {
        Config {
            database_url: "postgres://localhost/jobassist_test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            upload_folder,
            mock_user_id: DEFAULT_USER_ID.parse().unwrap(),
            run_migrations: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
