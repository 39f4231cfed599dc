//! Console configuration
//!
//! Command-line/environment values win over the `[console]` table of the
//! shared config file, which wins over compiled defaults.

use opcon_common::config::TomlConfig;
use opcon_common::time::millis_to_duration;
use std::time::Duration;

/// Resolved console settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub service_url: String,
    pub tick_interval: Duration,
    pub history_limit: i64,
    pub request_timeout: Duration,
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConsoleOverrides {
    pub service_url: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub history_limit: Option<i64>,
}

impl ConsoleConfig {
    pub fn resolve(overrides: &ConsoleOverrides, file: &TomlConfig) -> Self {
        let section = &file.console;
        let service_url = overrides
            .service_url
            .clone()
            .unwrap_or_else(|| section.service_url.clone());

        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            tick_interval: millis_to_duration(
                overrides
                    .tick_interval_ms
                    .unwrap_or(section.tick_interval_ms)
                    .max(10),
            ),
            history_limit: overrides
                .history_limit
                .unwrap_or(section.history_limit)
                .clamp(1, 100),
            request_timeout: millis_to_duration(section.request_timeout_ms.max(100)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_values_without_overrides() {
        let config = ConsoleConfig::resolve(&ConsoleOverrides::default(), &TomlConfig::default());
        assert_eq!(config.service_url, "http://127.0.0.1:5070");
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.history_limit, 8);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConsoleOverrides {
            service_url: Some("http://media-host:9000/".to_string()),
            tick_interval_ms: Some(1),
            history_limit: Some(500),
        };
        let config = ConsoleConfig::resolve(&overrides, &TomlConfig::default());
        assert_eq!(config.service_url, "http://media-host:9000");
        assert_eq!(config.tick_interval, Duration::from_millis(10));
        assert_eq!(config.history_limit, 100);
    }
}
