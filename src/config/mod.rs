//! TOML configuration: API access, cache, output, logging.
//!
//! A missing config file means defaults; every section and field is
//! optional. Paths accept `~`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default config directory name under `$HOME`.
pub const APP_DIR_NAME: &str = ".ga4-reporter";

/// Env var that supplies the API token when the config file does not.
pub const TOKEN_ENV_VAR: &str = "GA4_ACCESS_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Pre-obtained OAuth2 bearer token for both GA4 APIs. Falls back to
    /// the `GA4_ACCESS_TOKEN` env var. Token acquisition is out of scope
    /// for this tool.
    #[serde(default)]
    pub access_token: Option<String>,
    /// GA4 Data API base URL. Override for testing against a stub.
    #[serde(default = "default_data_endpoint")]
    pub data_endpoint: String,
    /// GA4 Admin API base URL.
    #[serde(default = "default_admin_endpoint")]
    pub admin_endpoint: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Where cached report results live.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
    /// Entry lifetime in seconds. One week by default.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root directory for CSV/HTML output files.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            data_endpoint: default_data_endpoint(),
            admin_endpoint: default_admin_endpoint(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_data_endpoint() -> String {
    "https://analyticsdata.googleapis.com".to_string()
}

fn default_admin_endpoint() -> String {
    "https://analyticsadmin.googleapis.com".to_string()
}

fn default_cache_dir() -> String {
    format!("~/{APP_DIR_NAME}/cache")
}

// 1 hour = 3600, 1 day = 86400, 1 week = 604800
fn default_ttl_secs() -> u64 {
    604_800
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Default path: `~/.ga4-reporter/config.toml`.
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(APP_DIR_NAME).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default_with_env());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    fn default_with_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if self.api.access_token.is_none() {
            if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
                self.api.access_token = Some(token);
            }
        }
    }

    /// The API token, or an actionable error when none is configured.
    pub fn require_token(&self) -> Result<String> {
        match &self.api.access_token {
            Some(token) if !token.trim().is_empty() => Ok(token.clone()),
            _ => bail!(
                "No API access token configured. Set api.access_token in the config \
                 file or export {TOKEN_ENV_VAR}."
            ),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.cache.dir).as_ref())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output.dir).as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.ttl_secs, 604_800);
        assert_eq!(config.output.dir, "output");
        assert_eq!(config.logging.level, "warn");
        assert!(config.api.data_endpoint.starts_with("https://analyticsdata"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            ttl_secs = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl_secs, 3600);
        assert!(config.cache.dir.ends_with("/cache"));
    }

    #[test]
    fn require_token_rejects_blank() {
        let mut config = Config::default();
        config.api.access_token = Some("  ".into());
        assert!(config.require_token().is_err());

        config.api.access_token = Some("ya29.token".into());
        assert_eq!(config.require_token().unwrap(), "ya29.token");
    }

    #[test]
    fn load_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.cache.ttl_secs, 604_800);
    }

    #[test]
    fn load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cache\nttl_secs = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
