//! Logging initialization and configuration

use crate::{TelemetryError, TelemetryResult};
use ledgerkit_config::{LogFormat, TelemetrySettings};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level or filter directive (`info`, `ledgerkit_harness=debug`, ...)
    pub level: String,

    pub format: LogFormat,

    /// Enable ANSI colors
    pub color: bool,

    /// Include target in log output
    pub include_target: bool,

    /// Write to the test writer so output is captured per test
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            color: true,
            include_target: true,
            test_writer: false,
        }
    }
}

impl From<&TelemetrySettings> for LogConfig {
    fn from(settings: &TelemetrySettings) -> Self {
        Self {
            level: settings.log_level.clone(),
            format: settings.log_format,
            color: settings.color,
            ..Self::default()
        }
    }
}

/// Initialize the logging system. `RUST_LOG` takes precedence over
/// `config.level`.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match (config.format, config.test_writer) {
        (LogFormat::Text, false) => registry
            .with(
                fmt::layer()
                    .with_ansi(config.color)
                    .with_target(config.include_target),
            )
            .try_init(),
        (LogFormat::Text, true) => registry
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_ansi(config.color)
                    .with_target(config.include_target),
            )
            .try_init(),
        (LogFormat::Compact, false) => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(config.color)
                    .with_target(config.include_target),
            )
            .try_init(),
        (LogFormat::Compact, true) => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_test_writer()
                    .with_ansi(config.color)
                    .with_target(config.include_target),
            )
            .try_init(),
        (LogFormat::Json, false) => registry
            .with(fmt::layer().json().with_target(config.include_target))
            .try_init(),
        (LogFormat::Json, true) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_test_writer()
                    .with_target(config.include_target),
            )
            .try_init(),
    };
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!("Logging initialized with level: {}", config.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings() {
        let settings = TelemetrySettings {
            log_level: "debug".to_string(),
            log_format: LogFormat::Json,
            color: false,
        };
        let config = LogConfig::from(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.color);
        assert!(config.include_target);
    }

    #[test]
    fn second_initialization_is_an_error() {
        let config = LogConfig {
            test_writer: true,
            ..LogConfig::default()
        };
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
