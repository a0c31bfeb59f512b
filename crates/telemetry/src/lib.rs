//! # ledgerkit telemetry
//!
//! Structured logging for harness sessions. Test runs and tools call
//! [`init`] once; library crates only emit `tracing` events.

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogConfig};

/// Installs the global subscriber described by `settings`.
pub fn init(settings: &ledgerkit_config::TelemetrySettings) -> TelemetryResult<()> {
    init_logging(&LogConfig::from(settings))
}
