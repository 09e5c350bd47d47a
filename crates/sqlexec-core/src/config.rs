use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
///
/// Values outside the hard limits are pulled back in by
/// `RetryPolicy::from_config`, so a bad config never disables retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Total retry budget in seconds, measured from the first attempt.
    pub max_duration_secs: f64,
    /// Minimum backoff delay in seconds.
    pub delay_min_secs: f64,
    /// Maximum backoff delay in seconds.
    pub delay_max_secs: f64,
    /// Base delay in seconds for exponential backoff.
    pub delay_default_secs: f64,
    /// Add up to one second of random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            max_duration_secs: 900.0,
            delay_min_secs: 1.0,
            delay_max_secs: 60.0,
            delay_default_secs: 5.0,
            jitter: true,
        }
    }
}

/// Client configuration loaded from `~/.config/sqlexec/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Rows handed out per batch when draining a result cursor.
    pub arraysize: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            arraysize: 10_000,
            retry: None,
        }
    }
}

impl ClientConfig {
    /// Effective retry policy (configured or default), bounded to hard limits.
    pub fn retry_policy(&self) -> RetryPolicy {
        match &self.retry {
            Some(cfg) => RetryPolicy::from_config(cfg),
            None => RetryPolicy::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sqlexec")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<ClientConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ClientConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from `path`, writing a default file there if none exists.
pub fn load_or_init_at(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        let default_cfg = ClientConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClientConfig> {
    load_or_init_at(&config_path()?)
}
