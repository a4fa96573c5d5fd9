//! Configuration loading and types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, bail};
use serde::{Deserialize, Serialize};
use shopadmin_api::Resource;
use shopadmin_core::ViewOptions;

/// Top-level configuration of the shopadmin CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// View-model behaviour
    #[serde(default)]
    pub view: ViewOptions,
    /// Page size overrides keyed by resource name
    #[serde(default)]
    pub page_sizes: BTreeMap<String, u64>,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all resource paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or names an unknown
    /// resource
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error on malformed TOML, unknown resources in `[page_sizes]`
    /// or a zero page size
    pub fn parse(content: &str) -> eyre::Result<Self> {
        let config: Config = toml::from_str(content)?;
        for (key, size) in &config.page_sizes {
            key.parse::<Resource>()?;
            if *size == 0 {
                bail!("page size for {key} must be at least 1");
            }
        }
        Ok(config)
    }

    /// Load the explicit path, else the first config found on the default
    /// paths, else defaults
    ///
    /// Returns the path the configuration came from, if any.
    ///
    /// # Errors
    /// Returns error if the selected file cannot be loaded
    pub fn discover(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        // Check environment variable
        if let Ok(path) = std::env::var("SHOPADMIN_CONFIG") {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        // Try common paths
        let mut paths = vec![PathBuf::from("shopadmin.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("shopadmin/shopadmin.toml"));
        }

        for path in paths {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }

    /// Configured page size for `resource`, else its default
    #[must_use]
    pub fn page_size(&self, resource: Resource) -> u64 {
        self.page_sizes
            .iter()
            .find(|(key, _)| key.parse::<Resource>().ok() == Some(resource))
            .map_or_else(|| resource.default_page_size(), |(_, size)| *size)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/api/");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.log_level, "info");
        assert_eq!(config.view, ViewOptions::default());
        assert_eq!(config.page_size(Resource::Products), 12);
        assert_eq!(config.page_size(Resource::Notifications), 20);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://shop.example.com/api/"
            timeout_secs = 5

            [view]
            cancel_superseded = false

            [page_sizes]
            Products = 24
            posts = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://shop.example.com/api/");
        assert_eq!(config.api.log_level, "info");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(!config.view.cancel_superseded);
        assert_eq!(config.view.debounce_ms, 300);
        assert_eq!(config.page_size(Resource::Products), 24);
        assert_eq!(config.page_size(Resource::Posts), 6);
        assert_eq!(config.page_size(Resource::Users), 10);
    }

    #[test]
    fn test_rejects_unknown_resource() {
        let err = Config::parse("[page_sizes]\nwidgets = 5\n").unwrap_err();
        assert!(err.to_string().contains("widgets"));
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(Config::parse("[page_sizes]\nusers = 0\n").is_err());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let missing = Path::new("/nonexistent/shopadmin.toml");
        assert!(Config::discover(Some(missing)).is_err());
    }
}
