//! Client configuration.
//!
//! Holds where the server lives, the endpoint paths of its services, the
//! name of the session cookie and the server's page size. Every field has a
//! default, so a config file only needs to name what differs.
//!
//! The default location is `~/.config/reportview/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_MAX_QUERY_SIZE;

/// Application name used for the config directory path
const APP_NAME: &str = "reportview";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub auth_endpoint: String,
    pub products_endpoint: String,
    /// Path of the results service below a product's endpoint.
    pub viewer_endpoint: String,
    pub session_cookie_name: String,
    pub max_query_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8001,
            use_https: false,
            auth_endpoint: "/Authentication".to_string(),
            products_endpoint: "/Products".to_string(),
            viewer_endpoint: "/CodeCheckerService".to_string(),
            session_cookie_name: "__ccPrivilegedAccessToken".to_string(),
            max_query_size: DEFAULT_MAX_QUERY_SIZE,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_query_size == 0 {
            anyhow::bail!("max_query_size must be at least 1");
        }
        if self.session_cookie_name.is_empty() {
            anyhow::bail!("session_cookie_name must not be empty");
        }
        for path in [&self.auth_endpoint, &self.products_endpoint, &self.viewer_endpoint] {
            if !path.starts_with('/') {
                anyhow::bail!("Endpoint path must start with '/': {}", path);
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Endpoint path of a product's results service, e.g. `/Default/CodeCheckerService`.
    pub fn viewer_path(&self, product: &str) -> String {
        format!("/{}{}", product, self.viewer_endpoint)
    }

    pub fn auth_url(&self) -> String {
        format!("{}{}", self.base_url(), self.auth_endpoint)
    }

    pub fn products_url(&self) -> String {
        format!("{}{}", self.base_url(), self.products_endpoint)
    }

    pub fn viewer_url(&self, product: &str) -> String {
        format!("{}{}", self.base_url(), self.viewer_path(product))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
