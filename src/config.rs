//! Top-level application configuration.
//!
//! Configuration is stored as YAML (by default in the platform config
//! directory, `pagewise/config.yaml`) and includes:
//! - Default and selectable page sizes
//! - Search debounce window
//! - Whether stale data stays visible while a page reloads
//! - Fetch timeout

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{PagewiseError, Result};
use crate::pager::RetentionPolicy;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "PAGEWISE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Page size used when the UI has not picked one (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Page sizes the UI offers
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,

    /// Quiescence window for search input in milliseconds (default: 300)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Keep the last good page visible while the same query reloads (default: true)
    #[serde(default = "default_retain_stale")]
    pub retain_stale_during_reload: bool,

    /// Fetch timeout in seconds (default: 30, 0 = no timeout)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
}

fn default_page_size() -> usize {
    10
}

fn default_page_size_options() -> Vec<usize> {
    vec![10, 20, 50, 100]
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_retain_stale() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            search_debounce_ms: default_search_debounce_ms(),
            retain_stale_during_reload: default_retain_stale(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "pagewise")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .ok_or_else(|| {
                PagewiseError::Config("could not determine a config directory".to_string())
            })
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            PagewiseError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PagewiseError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            PagewiseError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Reject configurations the pager cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(PagewiseError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.page_size_options.is_empty() {
            return Err(PagewiseError::Config(
                "page_size_options must not be empty".to_string(),
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(PagewiseError::Config(
                "page_size_options must not contain zero".to_string(),
            ));
        }
        if !self.page_size_options.contains(&self.page_size) {
            return Err(PagewiseError::Config(format!(
                "page_size {} is not one of page_size_options {:?}",
                self.page_size, self.page_size_options
            )));
        }
        Ok(())
    }

    /// Whether `size` is one of the offered page sizes
    pub fn is_offered_page_size(&self, size: usize) -> bool {
        self.page_size_options.contains(&size)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Get the fetch timeout duration (zero means disabled)
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::from_flag(self.retain_stale_during_reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.page_size_options, vec![10, 20, 50, 100]);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.retention_policy(), RetentionPolicy::RetainStale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let yaml = r#"
page_size: 20
"#;

        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.fetch_timeout, 30);
        assert!(config.retain_stale_during_reload);
    }

    #[test]
    fn test_config_discard_on_reload() {
        let yaml = r#"
retain_stale_during_reload: false
"#;

        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.retention_policy(), RetentionPolicy::DiscardOnReload);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            page_size: 50,
            search_debounce_ms: 150,
            fetch_timeout: 0,
            ..Config::default()
        };

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let loaded: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.fetch_timeout(), Duration::ZERO);
    }

    #[test]
    fn test_validate_rejects_bad_page_sizes() {
        let zero = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(zero.validate().is_err());

        let unoffered = Config {
            page_size: 15,
            ..Config::default()
        };
        assert!(unoffered.validate().is_err());

        let empty = Config {
            page_size_options: vec![],
            ..Config::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_is_offered_page_size() {
        let config = Config::default();
        assert!(config.is_offered_page_size(50));
        assert!(!config.is_offered_page_size(7));
    }
}
