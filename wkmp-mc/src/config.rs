//! Configuration for wkmp-mc
//!
//! **[MXC-CFG-030]** All scoring constants are immutable, injectable values.
//! Compiled defaults reproduce the reference policy; any field may be
//! overridden from `mc.toml` (see [`wkmp_common::config::ConfigResolver`]).
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [scoring]
//! tempo_tolerance_bpm = 20.0
//! double_time_matching = true
//!
//! [scoring.blend]
//! traditional = 0.6
//! fingerprint = 0.4
//!
//! [scoring.key]
//! same = 1.0
//! adjacent = 0.8
//! two_steps = 0.4
//!
//! [weights]
//! energy = 1.2
//!
//! [batch]
//! worker_threads = 8
//! ```

use crate::fingerprint::DimensionWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wkmp_common::config::{ConfigResolver, LoggingConfig};
use wkmp_common::{Error, Result};

/// Config file name under the WKMP config directory
pub const CONFIG_FILE_NAME: &str = "mc.toml";
/// Environment variable overriding the config file path
pub const CONFIG_ENV_VAR: &str = "WKMP_MC_CONFIG";

/// Top-level wkmp-mc configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    pub logging: LoggingConfig,
    pub scoring: ScoringConfig,
    pub weights: DimensionWeights,
    pub batch: BatchConfig,
}

impl MixConfig {
    /// Resolve, load and validate the config file
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        let config: MixConfig =
            ConfigResolver::new(CONFIG_FILE_NAME, CONFIG_ENV_VAR).load(cli_arg)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MixConfig = wkmp_common::config::parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.weights.validate()?;
        self.batch.validate()
    }
}

/// Rule-based scoring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// BPM difference at which tempo compatibility reaches zero
    pub tempo_tolerance_bpm: f64,
    /// Treat double/half tempo as a direct match
    pub double_time_matching: bool,
    pub blend: BlendWeights,
    pub key: KeyScores,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tempo_tolerance_bpm: 20.0,
            double_time_matching: true,
            blend: BlendWeights::default(),
            key: KeyScores::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.tempo_tolerance_bpm.is_finite() || self.tempo_tolerance_bpm <= 0.0 {
            return Err(Error::Config(format!(
                "scoring.tempo_tolerance_bpm must be positive, got {}",
                self.tempo_tolerance_bpm
            )));
        }
        self.blend.validate()?;
        self.key.validate()
    }
}

/// Traditional (tempo/key/energy) vs fingerprint blend
///
/// Weights are relative: the blend divides by their sum, so `3`/`2` is the
/// same policy as `0.6`/`0.4`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub traditional: f64,
    pub fingerprint: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            traditional: 0.6,
            fingerprint: 0.4,
        }
    }
}

impl BlendWeights {
    /// Weighted blend of the two factors
    pub fn combine(&self, traditional_avg: f64, fingerprint_similarity: f64) -> f64 {
        let total = self.traditional + self.fingerprint;
        (self.traditional * traditional_avg + self.fingerprint * fingerprint_similarity) / total
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("traditional", self.traditional), ("fingerprint", self.fingerprint)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "scoring.blend.{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.traditional + self.fingerprint <= 0.0 {
            return Err(Error::Config("scoring.blend weights must not both be zero".into()));
        }
        Ok(())
    }
}

/// Key component value per harmonic distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyScores {
    /// Same key
    pub same: f64,
    /// One wheel step, or relative major/minor
    pub adjacent: f64,
    /// Two wheel steps
    pub two_steps: f64,
}

impl Default for KeyScores {
    fn default() -> Self {
        Self {
            same: 1.0,
            adjacent: 0.8,
            two_steps: 0.4,
        }
    }
}

impl KeyScores {
    /// Score for a harmonic distance in wheel steps
    pub fn for_distance(&self, steps: u8) -> f64 {
        match steps {
            0 => self.same,
            1 => self.adjacent,
            2 => self.two_steps,
            _ => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("same", self.same),
            ("adjacent", self.adjacent),
            ("two_steps", self.two_steps),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "scoring.key.{} must be within [0,1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Matrix worker pool settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for pair scoring; `None` uses the global rayon pool
    pub worker_threads: Option<usize>,
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(Error::Config("batch.worker_threads must be at least 1".into()));
        }
        Ok(())
    }
}
