use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::client::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured backend URL.
pub const API_URL_ENV: &str = "WEATHER_API_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_url = "http://weather.internal:8000"
/// history_limit = 200
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL.
    pub api_url: Option<String>,

    /// Number of historical records requested for charts.
    pub history_limit: Option<u32>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Store a backend URL, rejecting anything that is not http(s).
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "Backend URL must start with http:// or https:// (got '{url}')"
            ));
        }
        self.api_url = Some(url.trim_end_matches('/').to_string());
        Ok(())
    }

    /// Backend URL by precedence: explicit override, then environment, then
    /// the config file, then the local default.
    pub fn resolve_api_url(&self, cli_override: Option<&str>, env: Option<String>) -> String {
        cli_override
            .map(str::to_string)
            .or(env)
            .or_else(|| self.api_url.clone())
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Like [`Config::resolve_api_url`], reading the environment itself.
    pub fn api_url_from_env(&self, cli_override: Option<&str>) -> String {
        self.resolve_api_url(cli_override, std::env::var(API_URL_ENV).ok())
    }

    pub fn history_limit(&self) -> u32 {
        self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}
