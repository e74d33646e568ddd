//! Configuration file handling.
//!
//! Settings come from `dashboard.toml` (or the file named on the command
//! line). Every field has a default, so a missing file or section is fine.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::core::error::{DashboardError, Result};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Dataset location
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Aggregation tuning and name aliases
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Page settings
    #[serde(default)]
    pub web: WebConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker threads, actix default when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the funding CSV
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/startup_funding.csv")
}

/// Aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Length of the overall top-N rankings
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Rows in an investor's recent investments table
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Bars in an investor's biggest investments chart
    #[serde(default = "default_biggest_limit")]
    pub biggest_limit: usize,
    /// Slots for similar startups and investors
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
    /// Investors field value that hides the real investors
    #[serde(default = "default_undisclosed_marker")]
    pub undisclosed_marker: String,
    /// Alternate city spellings mapped to the canonical one
    #[serde(default = "default_city_aliases")]
    pub city_aliases: BTreeMap<String, String>,
    /// Alternate investor spellings mapped to the canonical one
    #[serde(default = "default_investor_aliases")]
    pub investor_aliases: BTreeMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            recent_limit: default_recent_limit(),
            biggest_limit: default_biggest_limit(),
            similar_limit: default_similar_limit(),
            undisclosed_marker: default_undisclosed_marker(),
            city_aliases: default_city_aliases(),
            investor_aliases: default_investor_aliases(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_recent_limit() -> usize {
    5
}

fn default_biggest_limit() -> usize {
    5
}

fn default_similar_limit() -> usize {
    4
}

fn default_undisclosed_marker() -> String {
    "Undisclosed Investors".to_string()
}

fn default_city_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("Bengaluru".to_string(), "Bangalore".to_string())])
}

fn default_investor_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("Softbank".to_string(), "SoftBank Group".to_string())])
}

/// Page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Title shown in the sidebar and browser tab
    #[serde(default = "default_title")]
    pub title: String,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_title() -> String {
    "Startup Funding Analysis".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./src/web/static")
}

impl DashboardConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: DashboardConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration: file, then command-line overrides
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags take precedence over the file
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(path) = &args.data {
            self.dataset.path = path.clone();
        }
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.top_n == 0 {
            return Err(DashboardError::ConfigError(
                "analysis.top_n must be at least 1".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(DashboardError::ConfigError(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.similar_limit, 4);
        assert_eq!(
            config.analysis.city_aliases.get("Bengaluru"),
            Some(&"Bangalore".to_string())
        );
        assert_eq!(
            config.analysis.investor_aliases.get("Softbank"),
            Some(&"SoftBank Group".to_string())
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000\n\n[analysis]\ntop_n = 5").unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.analysis.top_n, 5);
        assert_eq!(config.analysis.recent_limit, 5);
        assert_eq!(config.dataset.path, PathBuf::from("data/startup_funding.csv"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ntop_n = 0").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(file.path()),
            Err(DashboardError::ConfigError(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"eighty\"").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(file.path()),
            Err(DashboardError::Toml(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9000\n[dataset]\npath = \"a.csv\"").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = Args::parse_from([
            "funding_dashboard",
            "--config",
            path.as_str(),
            "--port",
            "9100",
            "--data",
            "b.csv",
        ]);
        let config = DashboardConfig::resolve(&args).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.dataset.path, PathBuf::from("b.csv"));
    }
}
