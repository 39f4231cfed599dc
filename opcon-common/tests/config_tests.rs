//! Configuration resolution tests
//!
//! Covers config file discovery and loading plus data folder priority.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests that
//! manipulate OPCON_CONFIG or OPCON_DATA_FOLDER are marked with #[serial].

use opcon_common::config::{
    load_config, load_toml_config, resolve_config_path, resolve_data_folder, TomlConfig,
    CONFIG_ENV_VAR, DATA_FOLDER_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
        [aggregator]
        port = 6001
        data_folder = "/srv/opcon"
        history_limit = 20
        leaderboard_limit = 5

        [console]
        service_url = "http://10.0.0.4:6001"
        tick_interval_ms = 100
        history_limit = 3
        request_timeout_ms = 2000
        "#,
    );

    let config = load_toml_config(file.path()).expect("config should parse");
    assert_eq!(config.aggregator.port, 6001);
    assert_eq!(config.aggregator.data_folder, Some(PathBuf::from("/srv/opcon")));
    assert_eq!(config.aggregator.history_limit, 20);
    assert_eq!(config.aggregator.leaderboard_limit, 5);
    assert_eq!(config.console.service_url, "http://10.0.0.4:6001");
    assert_eq!(config.console.tick_interval_ms, 100);
    assert_eq!(config.console.history_limit, 3);
    assert_eq!(config.console.request_timeout_ms, 2000);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("[aggregator\nport = ");
    let err = load_toml_config(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let err = load_config(Some(Path::new("/nonexistent/opcon/config.toml"))).unwrap_err();
    assert!(err.to_string().contains("Cannot read config file"));
}

#[test]
#[serial]
fn test_env_var_names_config_file() {
    let file = write_config("[console]\nservice_url = \"http://from-env:1\"\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let resolved = resolve_config_path(None);
    assert_eq!(resolved.as_deref(), Some(file.path()));

    let config = load_config(None).expect("config from env path");
    assert_eq!(config.console.service_url, "http://from-env:1");

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_config_path_beats_env() {
    env::set_var(CONFIG_ENV_VAR, "/from/env/config.toml");
    let resolved = resolve_config_path(Some(Path::new("/from/cli/config.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/from/cli/config.toml")));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_data_folder_priority() {
    let mut config = TomlConfig::default();
    config.aggregator.data_folder = Some(PathBuf::from("/from/toml"));

    // TOML beats the compiled default
    env::remove_var(DATA_FOLDER_ENV_VAR);
    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/from/toml"));

    // Environment beats TOML
    env::set_var(DATA_FOLDER_ENV_VAR, "/from/env");
    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/from/env"));

    // Command line beats everything
    assert_eq!(
        resolve_data_folder(Some(Path::new("/from/cli")), &config),
        PathBuf::from("/from/cli")
    );

    env::remove_var(DATA_FOLDER_ENV_VAR);
}

#[test]
#[serial]
fn test_data_folder_compiled_default() {
    env::remove_var(DATA_FOLDER_ENV_VAR);
    let folder = resolve_data_folder(None, &TomlConfig::default());
    assert!(!folder.as_os_str().is_empty());
    assert!(folder.ends_with("opcon") || folder.ends_with("opcon_data"));
}
