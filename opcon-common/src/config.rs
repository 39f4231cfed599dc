//! Configuration loading and data folder resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling lives in each binary's clap
//! definition; this module covers the TOML file and the defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "OPCON_CONFIG";

/// Environment variable naming the service data folder
pub const DATA_FOLDER_ENV_VAR: &str = "OPCON_DATA_FOLDER";

/// SQLite database file name inside the data folder
pub const DATABASE_FILE: &str = "media_control.sqlite3";

/// Parsed `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub aggregator: AggregatorSection,
    pub console: ConsoleSection,
}

/// `[aggregator]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorSection {
    pub port: u16,
    pub data_folder: Option<PathBuf>,
    /// Default history page size when the request names none
    pub history_limit: i64,
    pub leaderboard_limit: i64,
}

impl Default for AggregatorSection {
    fn default() -> Self {
        Self {
            port: 5070,
            data_folder: None,
            history_limit: 8,
            leaderboard_limit: 10,
        }
    }
}

/// `[console]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    pub service_url: String,
    /// How often the simulated transport clock advances
    pub tick_interval_ms: u64,
    pub history_limit: i64,
    pub request_timeout_ms: u64,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:5070".to_string(),
            tick_interval_ms: 250,
            history_limit: 8,
            request_timeout_ms: 10_000,
        }
    }
}

/// Locate the config file.
///
/// An explicit path (argument or `OPCON_CONFIG`) is returned even if it does
/// not exist so the caller can report it; platform locations are only
/// returned when present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_file()
}

/// Read and parse a config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}

/// Resolve and load the configuration.
///
/// No config file at all is not an error: defaults apply. A file that was
/// named explicitly but cannot be read or parsed is.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            debug!("Loading config file {}", path.display());
            load_toml_config(&path)
        }
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the service data folder (argument → env → TOML → default)
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.aggregator.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// Platform config file location, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("opcon").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/opcon/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("opcon"))
        .unwrap_or_else(|| PathBuf::from("./opcon_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.aggregator.port, 5070);
        assert_eq!(config.aggregator.history_limit, 8);
        assert_eq!(config.aggregator.leaderboard_limit, 10);
        assert_eq!(config.console.service_url, "http://127.0.0.1:5070");
        assert_eq!(config.console.tick_interval_ms, 250);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [console]
            service_url = "http://media-host:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.console.service_url, "http://media-host:8080");
        assert_eq!(config.console.tick_interval_ms, 250);
        assert_eq!(config.aggregator.port, 5070);
    }

    #[test]
    fn test_explicit_cli_data_folder_wins() {
        let mut config = TomlConfig::default();
        config.aggregator.data_folder = Some(PathBuf::from("/from/toml"));
        let resolved = resolve_data_folder(Some(Path::new("/from/cli")), &config);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }
}
