//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, then the explicit override, then config
pub fn build_filter(config: &LoggingConfig, override_level: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = override_level.unwrap_or(&config.level);
    EnvFilter::try_new(directive)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", directive, e)))
}

/// Install the global fmt subscriber (stderr, so stdout stays machine-readable)
pub fn init_tracing(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let filter = build_filter(config, override_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))
}
