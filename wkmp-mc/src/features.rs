//! Raw per-track audio features
//!
//! **[MXC-IN-010]** Input contract from the feature-extraction service.
//! Every field is explicit: an absent value is `None`, never a default.
//! Field names are checked at compile time, replacing string-keyed feature
//! dictionaries.

use crate::key::MusicalKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw features for one track, as produced by the extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    /// Tempo in beats per minute (positive)
    pub tempo: Option<f64>,
    /// One of the 24 musical keys
    pub key: Option<MusicalKey>,
    /// Overall energy [0,1]
    pub energy: Option<f64>,
    /// Spectral centroid in Hz
    pub spectral_centroid: Option<f64>,
    pub dynamic_range: Option<f64>,
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
    pub instrumentalness: Option<f64>,
    /// Derived by the extractor; passed through here
    pub harmonic_complexity: Option<f64>,
    /// Derived by the extractor; passed through here
    pub tempo_stability: Option<f64>,
    /// Derived by the extractor; passed through here
    pub rhythmic_pattern: Option<f64>,
    /// Track length in seconds (optional, not part of the fingerprint)
    pub duration: Option<f64>,
}

/// Names of the raw feature fields, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Tempo,
    Key,
    Energy,
    SpectralCentroid,
    DynamicRange,
    Acousticness,
    Danceability,
    Valence,
    Instrumentalness,
    HarmonicComplexity,
    TempoStability,
    RhythmicPattern,
    Duration,
}

impl FeatureField {
    /// Field name as it appears in the serialized record
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureField::Tempo => "tempo",
            FeatureField::Key => "key",
            FeatureField::Energy => "energy",
            FeatureField::SpectralCentroid => "spectral_centroid",
            FeatureField::DynamicRange => "dynamic_range",
            FeatureField::Acousticness => "acousticness",
            FeatureField::Danceability => "danceability",
            FeatureField::Valence => "valence",
            FeatureField::Instrumentalness => "instrumentalness",
            FeatureField::HarmonicComplexity => "harmonic_complexity",
            FeatureField::TempoStability => "tempo_stability",
            FeatureField::RhythmicPattern => "rhythmic_pattern",
            FeatureField::Duration => "duration",
        }
    }
}

impl fmt::Display for FeatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw features tagged with the owning track's identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    pub track_id: String,
    pub features: RawFeatures,
}

impl TrackFeatures {
    pub fn new(track_id: impl Into<String>, features: RawFeatures) -> Self {
        Self {
            track_id: track_id.into(),
            features,
        }
    }
}
