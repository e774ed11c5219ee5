use anyhow::{Context, Result};

const DEFAULT_DATASET_URL: &str = "https://onu1.s2.chalmers.se/datasets/AI_ML_jobs.json";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub dataset_url: String,
    pub fetch_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    /// Drop the cached dataset once at startup so the next request re-fetches it.
    pub reset_dataset_cache: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            dataset_url: std::env::var("DATASET_URL")
                .unwrap_or_else(|_| DEFAULT_DATASET_URL.to_string()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reset_dataset_cache: std::env::var("RESET_DATASET_CACHE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
