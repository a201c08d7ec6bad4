//! Application configuration.

use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::storage::ConfigError;
use crate::domain::entities::ApiKey;
use crate::infrastructure::http::{DEFAULT_TIMEOUT_SECS, USER_AGENT};
use crate::infrastructure::image::DEFAULT_CAPACITY_BYTES;

const APP_NAME: &str = "infinigallery";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "infinigallery";

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com/photos";
const DEFAULT_ORDER_BY: &str = "latest";
const DEFAULT_TOTAL_PAGES: u32 = 10_000;

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration file contents.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Listing API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Image cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// HTTP transport configuration.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Listing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listing endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static access key, usually supplied through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Ordering criterion sent as `order_by`.
    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// Upper bound on page numbers.
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,

    /// Page requested first.
    #[serde(default = "default_first_page")]
    pub first_page: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            order_by: default_order_by(),
            total_pages: default_total_pages(),
            first_page: default_first_page(),
        }
    }
}

/// Image cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Budget for decoded images, in bytes.
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: default_capacity_bytes(),
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_order_by() -> String {
    DEFAULT_ORDER_BY.to_string()
}

fn default_total_pages() -> u32 {
    DEFAULT_TOTAL_PAGES
}

fn default_first_page() -> u32 {
    1
}

fn default_capacity_bytes() -> usize {
    DEFAULT_CAPACITY_BYTES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

/// Validated settings the gallery engine is built from.
#[derive(Debug, Clone)]
pub struct GallerySettings {
    /// Listing endpoint.
    pub base_url: Url,
    /// Access key.
    pub api_key: ApiKey,
    /// Ordering criterion.
    pub order_by: String,
    /// Upper bound on page numbers.
    pub total_pages: u32,
    /// Page requested first.
    pub first_page: u32,
    /// Image cache budget in bytes.
    pub cache_capacity: usize,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// HTTP user agent.
    pub user_agent: String,
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_key) = args.api_key {
            self.api.api_key = Some(api_key);
        }
        if let Some(base_url) = args.base_url {
            self.api.base_url = base_url;
        }
        if let Some(order_by) = args.order_by {
            self.api.order_by = order_by;
        }
        if let Some(total_pages) = args.total_pages {
            self.api.total_pages = total_pages;
        }
        if let Some(capacity) = args.cache_capacity {
            self.cache.capacity_bytes = capacity;
        }
    }

    /// Validates the configuration into engine settings.
    ///
    /// # Errors
    /// Returns `ConfigError` if the base URL does not parse, no API key is
    /// set, or a page bound is zero.
    pub fn gallery_settings(&self) -> Result<GallerySettings, ConfigError> {
        let base_url = Url::parse(&self.api.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            reason: e.to_string(),
        })?;

        let api_key = self
            .api
            .api_key
            .clone()
            .and_then(ApiKey::new)
            .ok_or(ConfigError::MissingApiKey)?;

        if self.api.total_pages == 0 {
            return Err(ConfigError::invalid("api.total_pages must be at least 1"));
        }
        if self.api.first_page == 0 {
            return Err(ConfigError::invalid("api.first_page must be at least 1"));
        }

        Ok(GallerySettings {
            base_url,
            api_key,
            order_by: self.api.order_by.clone(),
            total_pages: self.api.total_pages,
            first_page: self.api.first_page,
            cache_capacity: self.cache.capacity_bytes,
            timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone(),
        })
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("infinigallery.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.api.api_key = Some("access-key-123".to_string());
        config
    }

    #[test]
    fn test_parse_config_sections() {
        let toml_content = r#"
            log_level = "debug"

            [api]
            base_url = "https://listing.example.com/photos"
            order_by = "popular"
            total_pages = 3

            [cache]
            capacity_bytes = 1024
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.api.base_url, "https://listing.example.com/photos");
        assert_eq!(config.api.order_by, "popular");
        assert_eq!(config.api.total_pages, 3);
        assert_eq!(config.api.first_page, 1);
        assert_eq!(config.cache.capacity_bytes, 1024);
        assert_eq!(config.http.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.total_pages, DEFAULT_TOTAL_PAGES);
        assert!(config.api.api_key.is_none());
        assert_eq!(config.cache.capacity_bytes, DEFAULT_CAPACITY_BYTES);
    }

    #[test]
    fn test_settings_require_api_key() {
        let result = AppConfig::default().gallery_settings();
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));

        let mut config = AppConfig::default();
        config.api.api_key = Some("   ".to_string());
        assert!(matches!(
            config.gallery_settings(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_settings_reject_bad_url() {
        let mut config = with_key();
        config.api.base_url = "not a url".to_string();

        assert!(matches!(
            config.gallery_settings(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_settings_reject_zero_pages() {
        let mut config = with_key();
        config.api.total_pages = 0;

        assert!(matches!(
            config.gallery_settings(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_valid_settings() {
        let settings = with_key().gallery_settings().unwrap();

        assert_eq!(settings.api_key.as_str(), "access-key-123");
        assert_eq!(settings.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = with_key();
        let args = CliArgs::parse_from([
            "infinigallery",
            "--api-key",
            "from-cli",
            "--total-pages",
            "7",
            "--cache-capacity",
            "2048",
            "--log-level",
            "warn",
        ]);

        config.merge_with_args(args);

        assert_eq!(config.api.api_key.as_deref(), Some("from-cli"));
        assert_eq!(config.api.total_pages, 7);
        assert_eq!(config.cache.capacity_bytes, 2048);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_api_key_not_serialized_when_absent() {
        let serialized = toml::to_string(&AppConfig::default()).unwrap();
        assert!(!serialized.contains("api_key"));
    }
}
