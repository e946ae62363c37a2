use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use logscope_types::DEFAULT_PAGE_SIZE;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9302";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings read from `config.toml`. Unknown keys are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load from `path`, or from the platform config directory when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) => p,
                None => {
                    tracing::debug!("no platform config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `config.toml` inside the platform config directory
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "logscope").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:9302");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse("base_url = \"http://logs.internal:8080/api\"\n").unwrap();
        assert_eq!(config.base_url, "http://logs.internal:8080/api");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = Config::parse("page_size = 25\ntheme = \"dark\"\n").unwrap();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::parse("timeout_secs = \"soon\"").is_err());
        assert!(Config::parse("page_size = 0").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("logscope-test-missing/config.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }
}
