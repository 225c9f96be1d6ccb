//! Fingerprint dimensions, weights and the Vector Builder
//!
//! **[MXC-FP-010]** A fingerprint is the ordered 12-dimensional weighted
//! descriptor of a track. Dimension order is fixed system-wide; downstream
//! consumers rely on positional meaning, so reordering requires a new
//! format version (see `export::FINGERPRINT_FORMAT_VERSION`).
//!
//! **[MXC-FP-020]** Weighting: `fp[i] = clamp01(normalized[i] * w[i] / max(w))`.
//! Dividing by the largest weight keeps every component inside [0,1].

use crate::normalizer::clamp01;
use serde::{Deserialize, Serialize};
use wkmp_common::{Error, Result};

/// Number of fingerprint dimensions
pub const DIMENSION_COUNT: usize = 12;

/// Fingerprint dimensions in their fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Tempo,
    KeySignature,
    HarmonicComplexity,
    TempoStability,
    RhythmicPattern,
    Energy,
    SpectralCentroid,
    DynamicRange,
    Acousticness,
    Danceability,
    Valence,
    Instrumentalness,
}

impl Dimension {
    /// All dimensions in fingerprint order
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Tempo,
        Dimension::KeySignature,
        Dimension::HarmonicComplexity,
        Dimension::TempoStability,
        Dimension::RhythmicPattern,
        Dimension::Energy,
        Dimension::SpectralCentroid,
        Dimension::DynamicRange,
        Dimension::Acousticness,
        Dimension::Danceability,
        Dimension::Valence,
        Dimension::Instrumentalness,
    ];

    /// Position in the fingerprint
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Tempo => "tempo",
            Dimension::KeySignature => "key_signature",
            Dimension::HarmonicComplexity => "harmonic_complexity",
            Dimension::TempoStability => "tempo_stability",
            Dimension::RhythmicPattern => "rhythmic_pattern",
            Dimension::Energy => "energy",
            Dimension::SpectralCentroid => "spectral_centroid",
            Dimension::DynamicRange => "dynamic_range",
            Dimension::Acousticness => "acousticness",
            Dimension::Danceability => "danceability",
            Dimension::Valence => "valence",
            Dimension::Instrumentalness => "instrumentalness",
        }
    }
}

/// Per-dimension importance weights
///
/// Immutable once built; injected into `VectorBuilder`. Any subset of
/// dimensions can be overridden from the `[weights]` TOML table, the rest
/// keep the default table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub tempo: f64,
    pub key_signature: f64,
    pub harmonic_complexity: f64,
    pub tempo_stability: f64,
    pub rhythmic_pattern: f64,
    pub energy: f64,
    pub spectral_centroid: f64,
    pub dynamic_range: f64,
    pub acousticness: f64,
    pub danceability: f64,
    pub valence: f64,
    pub instrumentalness: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            tempo: 1.3,
            key_signature: 1.4,
            harmonic_complexity: 0.8,
            tempo_stability: 0.9,
            rhythmic_pattern: 1.1,
            energy: 1.2,
            spectral_centroid: 0.7,
            dynamic_range: 0.6,
            acousticness: 0.6,
            danceability: 0.9,
            valence: 0.8,
            instrumentalness: 0.5,
        }
    }
}

impl DimensionWeights {
    /// Weights in fingerprint order
    pub fn as_array(&self) -> [f64; DIMENSION_COUNT] {
        [
            self.tempo,
            self.key_signature,
            self.harmonic_complexity,
            self.tempo_stability,
            self.rhythmic_pattern,
            self.energy,
            self.spectral_centroid,
            self.dynamic_range,
            self.acousticness,
            self.danceability,
            self.valence,
            self.instrumentalness,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.as_array()[dimension.index()]
    }

    /// Largest weight in the table
    pub fn max_weight(&self) -> f64 {
        self.as_array().into_iter().fold(0.0, f64::max)
    }

    /// Reject non-finite or negative weights, and an all-zero table
    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "weights.{} must be a finite non-negative number, got {}",
                    dimension.name(),
                    weight
                )));
            }
        }
        if self.max_weight() <= 0.0 {
            return Err(Error::Config("at least one dimension weight must be positive".into()));
        }
        Ok(())
    }
}

/// Ordered weighted descriptor of one track
///
/// Holds a plain vector so that records loaded from storage (possibly with
/// the wrong length) can be represented and rejected by the quality gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint {
    values: Vec<f64>,
}

impl Fingerprint {
    /// Wrap arbitrary values; nothing is checked until the quality gate runs
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Component for a dimension, if present
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        self.values.get(dimension.index()).copied()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Vector Builder
///
/// Applies the weight table to normalized features.
#[derive(Debug, Clone)]
pub struct VectorBuilder {
    weights: [f64; DIMENSION_COUNT],
    max_weight: f64,
}

impl VectorBuilder {
    /// Create builder from a validated weight table
    pub fn new(weights: DimensionWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self {
            weights: weights.as_array(),
            max_weight: weights.max_weight(),
        })
    }

    /// Build a fingerprint from normalized features (pre-weight, [0,1])
    pub fn build(&self, normalized: [f64; DIMENSION_COUNT]) -> Fingerprint {
        let values = normalized
            .iter()
            .zip(self.weights.iter())
            .map(|(value, weight)| clamp01(value * weight / self.max_weight))
            .collect();
        Fingerprint::from_values(values)
    }
}

impl Default for VectorBuilder {
    fn default() -> Self {
        let weights = DimensionWeights::default();
        Self {
            weights: weights.as_array(),
            max_weight: weights.max_weight(),
        }
    }
}
