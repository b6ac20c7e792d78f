//! Process configuration read from the environment.

use std::time::Duration;

use actors::{DEFAULT_COMPLETION_DELAY, EngineConfig};
use db::DbConfig;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_WEBHOOK_URL: &str = "https://webhook.site/unique-id";
pub const DEFAULT_DATABASE_URL: &str = "mem://";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Settings for one server process.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_url: String,
    pub database_url: String,
    pub completion_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl Config {
    /// Read `PORT`, `WEBHOOK_URL`, `DATABASE_URL` and `JOB_COMPLETION_DELAY_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => parse_number("PORT", value)?,
            None => defaults.port,
        };

        let completion_delay = match var("JOB_COMPLETION_DELAY_MS") {
            Some(value) => Duration::from_millis(parse_number("JOB_COMPLETION_DELAY_MS", value)?),
            None => defaults.completion_delay,
        };

        let webhook_url = var("WEBHOOK_URL").unwrap_or_else(|| {
            tracing::warn!(
                "WEBHOOK_URL not set; notifications go to {}",
                DEFAULT_WEBHOOK_URL
            );
            defaults.webhook_url
        });

        Ok(Self {
            port,
            webhook_url,
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            completion_delay,
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::endpoint(self.database_url.clone())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().with_completion_delay(self.completion_delay)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
