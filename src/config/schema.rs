use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::output::OutputFormat;

/// Cache TTL used when the config does not set one
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// GitHub login whose PRs are collected
    pub username: Option<String>,
    /// Repositories as "owner/name"
    #[serde(default)]
    pub repositories: Vec<String>,
    /// REST base URL, for GitHub Enterprise
    pub api_url: Option<String>,
    /// Report cache lifetime, e.g. "10m" or "1h 30m"
    pub cache_ttl: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Config {
    pub fn cache_ttl(&self) -> Result<Duration> {
        match self.cache_ttl.as_deref() {
            Some(raw) => humantime::parse_duration(raw.trim())
                .with_context(|| format!("Invalid cache_ttl '{}'. Use values like 10m or 1h", raw)),
            None => Ok(DEFAULT_CACHE_TTL),
        }
    }
}
