use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Catalog service configuration.
///
/// Loaded from an optional TOML file; every field has a default, so a
/// partial file (or none at all) is valid:
///
/// ```toml
/// data_dir = "/var/lib/catalog"
/// listen = "127.0.0.1:8080"
/// request_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding the redb database file.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/catalog.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Directory of product seed files loaded at startup.
    pub seed_dir: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Page size used when a request omits `limit`.
    pub default_limit: i64,

    /// Deadline for a single storage round trip. 0 disables it.
    pub request_timeout_ms: u64,

    /// Title searches that read more rows than this before filling the page
    /// are logged at warn level. A scan stops once the page is full, so broad
    /// terms read far fewer rows than the catalog holds.
    pub search_scan_warn_threshold: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            seed_dir: None,
            listen: "0.0.0.0:8080".to_string(),
            default_limit: 20,
            request_timeout_ms: 5_000,
            search_scan_warn_threshold: 10_000,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ServiceConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no request could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit <= 0 {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be positive, got {}",
                self.default_limit
            )));
        }
        if self.listen.is_empty() {
            return Err(ConfigError::Invalid("listen address is empty".to_string()));
        }
        Ok(())
    }

    /// Resolve the redb database path, falling back to `{data_dir}/catalog.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("catalog.redb"))
                .unwrap_or_else(|| PathBuf::from("catalog.redb"))
        })
    }

    /// Storage deadline, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}
