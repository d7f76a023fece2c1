//! Shell configuration.
//!
//! Read from a JSON file; every field has a default so a missing file or a
//! partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_gate::LoadingRule;
use storefront_queries::QueryConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub api_base_url: String,
    pub status_path: String,
    pub catalog_path: String,
    pub request_timeout_ms: u64,
    /// Poll both queries on this interval. `None` fetches once.
    pub refetch_interval_ms: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub loading_rule: LoadingRule,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            status_path: "/store/status".to_string(),
            catalog_path: "/categories/tree".to_string(),
            request_timeout_ms: 10_000,
            refetch_interval_ms: None,
            retries: storefront_queries::DEFAULT_RETRIES,
            retry_delay_ms: storefront_queries::DEFAULT_RETRY_DELAY.as_millis() as u64,
            loading_rule: LoadingRule::BothPending,
        }
    }
}

/// `<config_dir>/storefront/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("storefront").join("config.json"))
}

impl ShellConfig {
    /// Load using the process environment.
    ///
    /// 1. `$STOREFRONT_CONFIG` (must exist)
    /// 2. `<config_dir>/storefront/config.json` (optional)
    /// 3. Defaults
    ///
    /// `$STOREFRONT_API_URL` then overrides the base URL.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            default_config_path(),
            std::env::var(API_URL_ENV).ok(),
        )
    }

    pub fn load_with(
        explicit: Option<PathBuf>,
        fallback: Option<PathBuf>,
        api_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match (explicit, fallback) {
            (Some(path), _) => Self::load_from(&path)?,
            (None, Some(path)) if path.exists() => Self::load_from(&path)?,
            _ => {
                tracing::debug!("no config file, using defaults");
                Self::default()
            }
        };

        if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(api_base_url = %url, "api url overridden from environment");
            config.api_base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api_base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be http(s): {url}"
            )));
        }
        for (field, path) in [
            ("status_path", &self.status_path),
            ("catalog_path", &self.catalog_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{field} must start with '/': {path}"
                )));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be > 0".into()));
        }
        if self.refetch_interval_ms == Some(0) {
            return Err(ConfigError::Invalid("refetch_interval_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            refetch_interval: self.refetch_interval_ms.map(Duration::from_millis),
        }
    }
}
