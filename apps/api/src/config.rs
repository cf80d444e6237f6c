use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The generation credential is not part of this struct: `LlmClient` reads it on
/// first use so the service can start (and answer health checks) without it.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub fetch_timeout: Duration,
    pub page_text_max_chars: usize,
    pub llm_timeout: Duration,
    pub stage_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let stage_max_attempts: u32 = env_or("STAGE_MAX_ATTEMPTS", 1)?;
        anyhow::ensure!(
            stage_max_attempts >= 1,
            "STAGE_MAX_ATTEMPTS must be at least 1"
        );

        Ok(Config {
            port: env_or("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 15)?),
            page_text_max_chars: env_or("PAGE_TEXT_MAX_CHARS", 10_000)?,
            llm_timeout: Duration::from_secs(env_or("LLM_TIMEOUT_SECS", 120)?),
            stage_max_attempts,
        })
    }
}

/// Reads `key` and parses it, falling back to `default` when the variable is unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
