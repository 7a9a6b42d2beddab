//! Environment-driven bot configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Default lifetime of a dynamic component (15 minutes)
pub const DEFAULT_COMPONENT_TIMEOUT_SECS: u64 = 15 * 60;
/// Default interval between expiry sweeps (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    /// Guild for instant command registration during development
    pub discord_guild_id: Option<String>,
    pub log_level: String,
    pub component_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let discord_token =
            env::var("DISCORD_TOKEN").context("DISCORD_TOKEN environment variable not set")?;

        let discord_guild_id = env::var("DISCORD_GUILD_ID")
            .ok()
            .filter(|id| !id.trim().is_empty());

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let component_timeout = parse_secs(
            "COMPONENT_TIMEOUT_SECS",
            env::var("COMPONENT_TIMEOUT_SECS").ok(),
            DEFAULT_COMPONENT_TIMEOUT_SECS,
        )?;
        let sweep_interval = parse_secs(
            "COMPONENT_SWEEP_INTERVAL_SECS",
            env::var("COMPONENT_SWEEP_INTERVAL_SECS").ok(),
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;

        Ok(Config {
            discord_token,
            discord_guild_id,
            log_level,
            component_timeout,
            sweep_interval,
        })
    }
}

/// Parse a whole-seconds duration, falling back to `default` when unset
fn parse_secs(name: &str, raw: Option<String>, default: u64) -> Result<Duration> {
    let secs = match raw {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{name} must be a whole number of seconds, got '{value}'"))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("{name} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
