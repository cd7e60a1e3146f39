use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Quota units per one unit of currency, as shipped by the gateway.
pub const DEFAULT_QUOTA_PER_UNIT: f64 = 500_000.0;

/// Top-level config (oneadmin.toml + ONEADMIN_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the gateway's management API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// System access token, sent as a bearer header when set.
    /// Without it the console relies on the session cookie from login.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            access_token: None,
        }
    }
}

/// Local key/value cache standing in for browser storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_quota_per_unit")]
    pub quota_per_unit: f64,
    #[serde(default)]
    pub display_in_currency: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            quota_per_unit: default_quota_per_unit(),
            display_in_currency: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_quota_per_unit() -> f64 {
    DEFAULT_QUOTA_PER_UNIT
}

fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}

fn default_storage_path() -> String {
    format!("{}/.oneadmin/storage.json", home_dir())
}

pub fn default_config_path() -> String {
    format!("{}/.oneadmin/oneadmin.toml", home_dir())
}

impl ConsoleConfig {
    /// Load config from a TOML file with `ONEADMIN_*` env var overrides.
    /// Nested keys use a double underscore: `ONEADMIN_SERVER__BASE_URL`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ConsoleConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ONEADMIN_").split("__"))
            .extract()
            .map_err(|e| crate::error::ConsoleError::Config(e.to_string()))?;

        if config.display.page_size == 0 {
            warn!(path = %path, "display.page_size is 0");
            return Err(crate::error::ConsoleError::Config(
                "display.page_size must be at least 1".to_string(),
            ));
        }

        debug!(path = %path, base_url = %config.server.base_url, "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = ConsoleConfig::load(Some("/nonexistent/oneadmin.toml")).unwrap();
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.display.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.server.access_token.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbase_url = \"https://gw.example.com\"\naccess_token = \"abc\"\n\n[display]\npage_size = 25\ndisplay_in_currency = true"
        )
        .unwrap();

        let config = ConsoleConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.base_url, "https://gw.example.com");
        assert_eq!(config.server.access_token.as_deref(), Some("abc"));
        assert_eq!(config.server.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.display.page_size, 25);
        assert!(config.display.display_in_currency);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\npage_size = 0").unwrap();
        let err = ConsoleConfig::load(file.path().to_str()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
