// src/config.rs
use crate::errors::AppError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the endpoint paths are joined onto. Always ends with `/`.
    pub api_url: Url,
    /// JWT sent as `Authorization: JWT <token>`.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("FLAT_SCOUT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_base_url(&raw_url)?;

        let token = lookup("FLAT_SCOUT_TOKEN").filter(|t| !t.trim().is_empty());

        let timeout_secs = match lookup("FLAT_SCOUT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("FLAT_SCOUT_TIMEOUT_SECS is not a number: {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_api_url(mut self, raw: &str) -> Result<Self, AppError> {
        self.api_url = parse_base_url(raw)?;
        Ok(self)
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    Url::parse(&normalized).map_err(|e| AppError::Config(format!("bad API url {raw:?}: {e}")))
}
