//! Client configuration
//!
//! Read from `aula.toml` in the platform config directory. A missing file
//! means defaults; `AULA_API_URL` overrides the API root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, Result};

pub const CONFIG_FILE: &str = "aula.toml";
pub const API_URL_ENV: &str = "AULA_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API root
    pub api_base_url: String,
    /// Per-request timeout; unset means none
    pub request_timeout_secs: Option<u64>,
    /// Where client state is kept; defaults to the platform data directory
    pub data_dir: Option<PathBuf>,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: aula_net::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            data_dir: None,
            log_filter: "warn".to_string(),
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("cl", "utem", "aula")
}

impl Config {
    /// Load from `path`, or from the platform config directory
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => project_dirs().map(|d| d.config_dir().join(CONFIG_FILE)),
        };

        let config = match path {
            Some(p) if p.exists() => {
                info!(path = %p.display(), "Loading configuration");
                Self::from_path(&p)?
            }
            Some(p) => {
                debug!(path = %p.display(), "No configuration file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        Ok(config.with_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| AppError::Config(e.to_string()))
    }

    fn with_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .ok_or_else(|| AppError::Config("Could not determine data directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8000/api/");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://portal.example.cl/api/"
            request_timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://portal.example.cl/api/");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_bad_file() {
        let err = Config::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_url_override() {
        let config = Config::default().with_url_override(Some(" http://10.0.0.2/api/ ".into()));
        assert_eq!(config.api_base_url, "http://10.0.0.2/api/");
        let config = Config::default().with_url_override(Some("  ".into()));
        assert_eq!(config.api_base_url, aula_net::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "data_dir = \"/tmp/aula-test\"\n").unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.resolve_data_dir().unwrap(), PathBuf::from("/tmp/aula-test"));
    }
}
