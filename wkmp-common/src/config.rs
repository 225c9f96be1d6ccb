//! Configuration file resolution and loading
//!
//! **[MXC-CFG-010]** Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`<config dir>/wkmp/<file name>`)
//! 4. Compiled defaults (no file)
//!
//! **[MXC-CFG-020]** A missing config file SHALL NOT cause termination:
//! a warning is logged and compiled defaults are used.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging section shared by every WKMP TOML config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive (overridden by `RUST_LOG`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where a resolved config path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserConfigDir,
}

/// Resolves which TOML config file a module should read
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    file_name: String,
    env_var: String,
}

impl ConfigResolver {
    /// Create resolver for `file_name` under the WKMP config directory,
    /// overridable through `env_var`
    pub fn new(file_name: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            env_var: env_var.into(),
        }
    }

    /// Resolve config path following the [MXC-CFG-010] priority order
    ///
    /// Returns `None` when no explicit path was given and no per-user file
    /// exists, meaning compiled defaults apply.
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<(PathBuf, ConfigSource)> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some((path.to_path_buf(), ConfigSource::CommandLine));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), ConfigSource::Environment));
            }
        }

        // Priority 3: Per-user config directory
        self.user_config_path()
            .filter(|path| path.exists())
            .map(|path| (path, ConfigSource::UserConfigDir))
    }

    /// Platform config path (`~/.config/wkmp/<file>` on Linux)
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wkmp").join(&self.file_name))
    }

    /// Resolve and load the config, falling back to defaults
    ///
    /// An explicitly requested file (CLI or environment) that does not exist
    /// is an error; only the implicit per-user location degrades to defaults.
    pub fn load<T>(&self, cli_arg: Option<&Path>) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.resolve(cli_arg) {
            Some((path, source)) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found ({:?}): {}",
                        source,
                        path.display()
                    )));
                }
                info!("Loading configuration from {} ({:?})", path.display(), source);
                load_toml_file(&path)
            }
            None => {
                warn!(
                    "No {} found, using compiled defaults",
                    self.file_name
                );
                Ok(T::default())
            }
        }
    }
}

/// Read and parse a TOML file into `T`
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Parse TOML text into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        logging: LoggingConfig,
        name: Option<String>,
    }

    #[test]
    fn test_logging_default_level() {
        assert_eq!(LoggingConfig::default().level, "info");
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let sample: Sample = parse_toml("name = \"x\"").unwrap();
        assert_eq!(sample.name.as_deref(), Some("x"));
        assert_eq!(sample.logging, LoggingConfig::default());
    }

    #[test]
    fn test_parse_logging_section() {
        let sample: Sample = parse_toml("[logging]\nlevel = \"debug\"").unwrap();
        assert_eq!(sample.logging.level, "debug");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result: Result<Sample> = parse_toml("logging = [");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_cli_arg_takes_priority() {
        let resolver = ConfigResolver::new("mc.toml", "WKMP_TEST_UNUSED_VAR");
        let (path, source) = resolver.resolve(Some(Path::new("/tmp/explicit.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.toml"));
        assert_eq!(source, ConfigSource::CommandLine);
    }
}
