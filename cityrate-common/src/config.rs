//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is normal and falls through to the defaults. A
//! config file that exists but does not parse is an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::rating::DEFAULT_POPULARITY_THRESHOLD;
use crate::{Error, Result};

/// Overrides the API base URL
pub const API_URL_ENV: &str = "CITYRATE_API_URL";
/// Overrides the config file location
pub const CONFIG_PATH_ENV: &str = "CITYRATE_CONFIG";

const APP_DIR: &str = "cityrate";

/// Contents of `config.toml`
///
/// Every field is optional; absent fields fall back to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Base URL of the rating service
    #[serde(default)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Minimum definitive votes for "popular" filtering and profile ratings
    #[serde(default)]
    pub popularity_threshold: Option<u64>,

    /// Where the logged-in user id is kept
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Built-in fallbacks for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub api_url: String,
    pub request_timeout: Duration,
    pub popularity_threshold: u64,
    pub session_file: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
            session_file: default_app_dir()
                .map(|d| d.join("session.toml"))
                .unwrap_or_else(|| PathBuf::from("./cityrate_session.toml")),
            log_level: default_log_level(),
        }
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    TomlFile,
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::CommandLine => "command line",
            ConfigSource::Environment => "environment",
            ConfigSource::TomlFile => "TOML config",
            ConfigSource::Default => "compiled default",
        };
        f.write_str(name)
    }
}

/// Fully resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub api_url: String,
    pub api_url_source: ConfigSource,
    pub request_timeout: Duration,
    pub popularity_threshold: u64,
    pub session_file: PathBuf,
    pub log_level: String,
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
}

/// Resolves [`ClientConfig`] from CLI, environment, TOML and defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_api_url: Option<String>,
    cli_config_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.cli_api_url = api_url;
        self
    }

    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_config_path = path;
        self
    }

    /// Config file location: CLI → `CITYRATE_CONFIG` → platform config dir
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_config_path {
            return Some(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        default_config_path()
    }

    pub fn resolve(&self) -> Result<ClientConfig> {
        let defaults = CompiledDefaults::for_current_platform();

        let (toml_config, config_file) = match self.config_path() {
            Some(path) if path.exists() => (load_toml_config(&path)?, Some(path)),
            _ => (TomlConfig::default(), None),
        };

        let (api_url, api_url_source) = if let Some(url) = non_empty(self.cli_api_url.clone()) {
            (url, ConfigSource::CommandLine)
        } else if let Some(url) = non_empty(std::env::var(API_URL_ENV).ok()) {
            (url, ConfigSource::Environment)
        } else if let Some(url) = non_empty(toml_config.api_url.clone()) {
            (url, ConfigSource::TomlFile)
        } else {
            (defaults.api_url.clone(), ConfigSource::Default)
        };

        let request_timeout = match toml_config.request_timeout_secs {
            Some(0) => {
                return Err(Error::Config(
                    "request_timeout_secs must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        Ok(ClientConfig {
            api_url: normalize_url(&api_url),
            api_url_source,
            request_timeout,
            popularity_threshold: toml_config
                .popularity_threshold
                .unwrap_or(defaults.popularity_threshold),
            session_file: toml_config.session_file.unwrap_or(defaults.session_file),
            log_level: toml_config.logging.level,
            config_file,
        })
    }
}

/// `<config dir>/cityrate/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    default_app_dir().map(|d| d.join("config.toml"))
}

fn default_app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_strips_trailing_slashes() {
        assert_eq!(normalize_url("http://localhost:8080/"), "http://localhost:8080");
        assert_eq!(normalize_url(" http://x// "), "http://x");
        assert_eq!(normalize_url("http://x"), "http://x");
    }

    #[test]
    fn test_compiled_defaults() {
        let defaults = CompiledDefaults::for_current_platform();
        assert_eq!(defaults.api_url, DEFAULT_API_URL);
        assert_eq!(defaults.popularity_threshold, 10);
        assert_eq!(defaults.request_timeout, Duration::from_secs(30));
        assert!(defaults.session_file.ends_with("session.toml")
            || defaults.session_file.ends_with("cityrate_session.toml"));
    }

    #[test]
    fn test_empty_toml_parses_to_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.api_url.is_none());
        assert_eq!(config.logging.level, "warn");
    }
}
