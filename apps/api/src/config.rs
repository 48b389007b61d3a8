use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{ANTHROPIC_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Model identifier sent with every matching call.
    pub llm_model: String,
    pub llm_api_url: String,
    /// Deadline for a single matching call. The call is never retried.
    pub match_timeout: Duration,
    /// When false, results carry no `matchScore` at all.
    pub enable_match_scoring: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let match_timeout_secs = optional_env("MATCH_TIMEOUT_SECS", "90")
            .parse::<u64>()
            .context("MATCH_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: optional_env("LLM_MODEL", DEFAULT_MODEL),
            llm_api_url: optional_env("LLM_API_URL", ANTHROPIC_API_URL),
            match_timeout: Duration::from_secs(match_timeout_secs),
            enable_match_scoring: parse_flag(&optional_env("ENABLE_MATCH_SCORING", "true"))
                .context("ENABLE_MATCH_SCORING must be true or false")?,
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}
