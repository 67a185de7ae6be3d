//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_STATE_DIR: &str = ".blogdash";
pub const DEFAULT_STORAGE_KEY: &str = "user";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{0}': expected http:// or https://")]
    InvalidApiUrl(String),
    #[error("invalid storage key '{0}'")]
    InvalidStorageKey(String),
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Optional HTTP timeouts. `None` waits indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Directory holding persisted records.
    pub state_dir: PathBuf,
    /// Storage key of the persisted session record.
    pub storage_key: String,
    pub timeouts: HttpTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `BLOGDASH_API_URL`: default `http://localhost:3001`
    /// - `BLOGDASH_STATE_DIR`: default `.blogdash`
    /// - `BLOGDASH_STORAGE_KEY`: default `user`
    /// - `BLOGDASH_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `BLOGDASH_CONNECT_TIMEOUT_SECS`: unset means no timeout
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a value is present but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_api_url(
            lookup("BLOGDASH_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;
        let state_dir = lookup("BLOGDASH_STATE_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let storage_key = lookup("BLOGDASH_STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned());
        validate_storage_key(&storage_key)?;
        let timeouts = HttpTimeouts {
            request_secs: parse_secs("BLOGDASH_REQUEST_TIMEOUT_SECS", lookup("BLOGDASH_REQUEST_TIMEOUT_SECS"))?,
            connect_secs: parse_secs("BLOGDASH_CONNECT_TIMEOUT_SECS", lookup("BLOGDASH_CONNECT_TIMEOUT_SECS"))?,
        };

        Ok(Self { api_url, state_dir, storage_key, timeouts })
    }

    /// Replace the API URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for non-HTTP URLs.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(raw)?;
        Ok(self)
    }
}

pub(crate) fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::InvalidApiUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn validate_storage_key(key: &str) -> Result<(), ConfigError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if ok { Ok(()) } else { Err(ConfigError::InvalidStorageKey(key.to_owned())) }
}

fn parse_secs(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidNumber { var, value: raw }),
        Ok(secs) => Ok(Some(secs)),
    }
}
