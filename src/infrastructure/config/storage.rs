//! On-disk TOML configuration.

use super::app_config::AppConfig;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no platform configuration directory available")]
    ConfigDirNotFound,
    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize default config: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("no API key configured (set UNSPLASH_ACCESS_KEY or api.api_key)")]
    MissingApiKey,
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    /// Creates a validation error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single TOML config file, created with defaults on first use.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Uses `path_override` if given, otherwise `config.toml` in the
    /// platform configuration directory.
    ///
    /// # Errors
    /// Returns `ConfigDirNotFound` when no override is given and the platform
    /// has no configuration directory.
    pub fn locate(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_config_dir()
                .ok_or(ConfigError::ConfigDirNotFound)?
                .join(CONFIG_FILE_NAME),
        };
        Ok(Self { path })
    }

    /// Uses the file at `path`.
    #[must_use]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the config file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config. A missing file is created with defaults; a file
    /// that does not parse is left alone and defaults are used.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or the defaults
    /// cannot be written.
    pub fn load_or_init(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Writing default config");
                let defaults = AppConfig::default();
                self.write(&defaults)?;
                return Ok(defaults);
            }
            Err(e) => return Err(ConfigError::io(&self.path, e)),
        };

        Ok(toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Config does not parse, using defaults");
            AppConfig::default()
        }))
    }

    /// Replaces the file atomically through a sibling temp file.
    fn write(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;

        let mut staged =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::io(dir, e))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|e| ConfigError::io(staged.path(), e))?;
        staged
            .persist(&self.path)
            .map_err(|e| ConfigError::io(&self.path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let store = ConfigStore::at(path.clone());

        let config = store.load_or_init().unwrap();

        assert_eq!(config.api.first_page, 1);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[api]"));
        assert!(written.contains("[cache]"));
    }

    #[test]
    fn test_written_defaults_read_back() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join(CONFIG_FILE_NAME));

        let first = store.load_or_init().unwrap();
        let second = store.load_or_init().unwrap();

        assert_eq!(first.api.total_pages, second.api.total_pages);
        assert_eq!(first.cache.capacity_bytes, second.cache.capacity_bytes);
    }

    #[test]
    fn test_unparsable_file_falls_back_and_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "invalid_toml = [").unwrap();

        let config = ConfigStore::at(path.clone()).load_or_init().unwrap();

        assert!(config.api.api_key.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "invalid_toml = [");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "[api]\ntotal_pages = 3\napi_key = \"k\"\n").unwrap();

        let store = ConfigStore::locate(Some(&custom)).unwrap();
        let config = store.load_or_init().unwrap();

        assert_eq!(store.path(), custom.as_path());
        assert_eq!(config.api.total_pages, 3);
        assert_eq!(config.api.api_key.as_deref(), Some("k"));
        assert_eq!(config.api.order_by, "latest");
    }

    #[test]
    fn test_directory_in_place_of_file_is_an_io_error() {
        let dir = tempdir().unwrap();

        let err = ConfigStore::at(dir.path().to_path_buf())
            .load_or_init()
            .unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
