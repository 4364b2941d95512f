//! Server configuration: defaults, then the TOML file, then CLI flags.

use std::path::PathBuf;

use catalog_core::ServiceConfig;
use clap::Parser;

/// Catalog query server.
#[derive(Parser, Debug, Default)]
#[command(name = "catalogd", about = "Product catalog query server")]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    pub listen: Option<String>,

    /// Data directory holding the database file.
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Explicit database file path.
    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    /// Directory of product seed files loaded at startup.
    #[arg(long = "seed-dir")]
    pub seed_dir: Option<PathBuf>,

    /// Storage deadline per request in milliseconds (0 disables it).
    #[arg(long = "request-timeout-ms")]
    pub request_timeout_ms: Option<u64>,

    /// Keep products in memory instead of a database file.
    #[arg(long = "in-memory")]
    pub in_memory: bool,
}

/// Resolve the effective configuration for this run.
pub fn resolve(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(listen) = &cli.listen {
        config.listen = listen.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(path) = &cli.db_path {
        config.db_path = Some(path.clone());
    }
    if let Some(dir) = &cli.seed_dir {
        config.seed_dir = Some(dir.clone());
    }
    if let Some(ms) = cli.request_timeout_ms {
        config.request_timeout_ms = ms;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(&Cli::default()).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "listen = \"127.0.0.1:9000\"\ndata_dir = \"/srv/catalog\"\ndefault_limit = 50\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "catalogd",
            "-c",
            path.to_str().unwrap(),
            "--listen",
            "127.0.0.1:9999",
            "--request-timeout-ms",
            "250",
        ]);
        let config = resolve(&cli).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9999");
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/catalog")));
        assert_eq!(config.default_limit, 50);
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn test_bad_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "listen = [").unwrap();
        let cli = Cli {
            config: Some(path),
            ..Default::default()
        };
        assert!(resolve(&cli).is_err());
    }
}
