//! ledgerkit configuration
//!
//! Settings for the harness: where the node lives, how long to wait for
//! confirmations, the gas defaults applied to every submission, and how the
//! audit trail and logs are produced. Every section has defaults, so an empty
//! TOML document is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default JSON-RPC endpoint of a local development node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_MAX_POLLS: u32 = 240;

/// 20 gwei
pub const DEFAULT_GAS_PRICE: u64 = 20_000_000_000;
pub const DEFAULT_GAS_LIMIT: u64 = 6_000_000;

/// Label recorded for actions produced by a contract wrapper when the caller
/// gives none.
pub const DEFAULT_DEPLOYER_TYPE: &str = "ContractWrapper";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level harness settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    pub rpc: RpcSettings,
    pub confirmation: ConfirmationSettings,
    pub transactions: TransactionDefaults,
    pub history: HistorySettings,
    pub telemetry: TelemetrySettings,
}

impl HarnessSettings {
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let settings: HarnessSettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.rpc.url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "rpc.url",
                reason: "must not be empty".to_string(),
            });
        }
        self.confirmation.validate()
    }
}

/// Node endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub url: String,
    pub timeout_ms: u64,
}

impl RpcSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

/// Bounded polling policy used while waiting for inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationSettings {
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
    pub max_polls: u32,
}

impl ConfirmationSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_polls == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.max_polls",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT_MS,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Overrides applied to every submitted transaction unless the call
/// supplies its own. `None` lets the node decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDefaults {
    pub gas_price: Option<u64>,
    pub gas_limit: Option<u64>,
}

impl Default for TransactionDefaults {
    fn default() -> Self {
        Self {
            gas_price: Some(DEFAULT_GAS_PRICE),
            gas_limit: Some(DEFAULT_GAS_LIMIT),
        }
    }
}

/// Audit trail settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub deployer_type: String,
    /// When set, the history is written here as JSON at the end of a session.
    pub output_path: Option<PathBuf>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            deployer_type: DEFAULT_DEPLOYER_TYPE.to_string(),
            output_path: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub log_format: LogFormat,
    pub color: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            color: true,
        }
    }
}
