// Runtime configuration.
// Reads the API base, token, and cache capacity from the environment.

use std::time::Duration;

use crate::error::{OracleError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_CACHE_SIZE: usize = 128;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Process-wide settings, fixed once the context is initialised.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST API root, e.g. `https://ghe.example.com/api/v3` for Enterprise.
    pub api_base: String,
    pub token: Option<String>,
    /// Maximum number of cached responses.
    pub cache_size: usize,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Wait before retrying a rate-limited page.
    pub retry_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
            cache_size: DEFAULT_CACHE_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl Config {
    /// Build a config from `GITHUB_BASE`, `GITHUB_TOKEN` and `REPO_ORACLE_CACHE_SIZE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(base) = lookup("GITHUB_BASE").filter(|b| !b.trim().is_empty()) {
            config.api_base = base;
        }
        config.api_base = normalize_base(&config.api_base);

        config.token = lookup("GITHUB_TOKEN").filter(|t| !t.is_empty());

        if let Some(size) = lookup("REPO_ORACLE_CACHE_SIZE") {
            config.cache_size = parse_cache_size(&size)?;
        }

        Ok(config)
    }

    /// Override the API base, keeping it free of a trailing slash.
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = normalize_base(base);
        self
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

fn parse_cache_size(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(OracleError::InvalidArgument(format!(
            "REPO_ORACLE_CACHE_SIZE must be a positive integer, got {:?}",
            raw
        ))),
    }
}
