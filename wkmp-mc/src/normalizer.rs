//! Feature Normalizer
//!
//! Maps heterogeneous raw features onto twelve independent [0,1] scalars in
//! fingerprint dimension order (pre-weight).
//!
//! # Normalization Rules
//! - **Tempo:** linear rescale of [60, 180] BPM, clamped
//! - **Key:** wheel-order lookup (`MusicalKey::normalized`)
//! - **Spectral centroid:** `ln(1 + hz) / ln(1 + 11025)`, clamped
//! - **Everything else:** already [0,1] from the extractor, clamped
//!
//! NaN survives clamping on purpose: the quality gate rejects it, the
//! normalizer never repairs it.
//!
//! # Errors
//! - `MissingFeature` for any absent field except `duration`
//! - `InvalidValue` for a non-positive or infinite tempo, or a duration
//!   that is not finite and positive (NaN tempo is left to the gate)

use crate::features::{FeatureField, RawFeatures};
use crate::fingerprint::DIMENSION_COUNT;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Lower bound of the tempo reference range (BPM)
pub const TEMPO_RANGE_MIN_BPM: f64 = 60.0;
/// Upper bound of the tempo reference range (BPM)
pub const TEMPO_RANGE_MAX_BPM: f64 = 180.0;
/// Reference bandwidth for spectral centroid compression (Hz)
pub const SPECTRAL_REFERENCE_HZ: f64 = 11025.0;

/// Normalization failure; fatal for the track
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationError {
    /// Required raw field absent
    #[error("Missing feature: {0}")]
    MissingFeature(FeatureField),

    /// Field present but outside its physical domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: FeatureField, value: f64 },
}

/// Feature Normalizer
///
/// Stateless; safe to share across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw features into fingerprint dimension order
    pub fn normalize(&self, raw: &RawFeatures) -> Result<[f64; DIMENSION_COUNT], NormalizationError> {
        let tempo = require(raw.tempo, FeatureField::Tempo)?;
        if tempo.is_infinite() || tempo <= 0.0 {
            return Err(NormalizationError::InvalidValue {
                field: FeatureField::Tempo,
                value: tempo,
            });
        }
        if let Some(duration) = raw.duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(NormalizationError::InvalidValue {
                    field: FeatureField::Duration,
                    value: duration,
                });
            }
        }
        let key = raw.key.ok_or(NormalizationError::MissingFeature(FeatureField::Key))?;

        let normalized = [
            normalize_tempo(tempo),
            key.normalized(),
            unit(raw.harmonic_complexity, FeatureField::HarmonicComplexity)?,
            unit(raw.tempo_stability, FeatureField::TempoStability)?,
            unit(raw.rhythmic_pattern, FeatureField::RhythmicPattern)?,
            unit(raw.energy, FeatureField::Energy)?,
            normalize_spectral_centroid(require(
                raw.spectral_centroid,
                FeatureField::SpectralCentroid,
            )?),
            unit(raw.dynamic_range, FeatureField::DynamicRange)?,
            unit(raw.acousticness, FeatureField::Acousticness)?,
            unit(raw.danceability, FeatureField::Danceability)?,
            unit(raw.valence, FeatureField::Valence)?,
            unit(raw.instrumentalness, FeatureField::Instrumentalness)?,
        ];

        trace!(?normalized, "Features normalized");
        Ok(normalized)
    }
}

fn require(value: Option<f64>, field: FeatureField) -> Result<f64, NormalizationError> {
    value.ok_or(NormalizationError::MissingFeature(field))
}

fn unit(value: Option<f64>, field: FeatureField) -> Result<f64, NormalizationError> {
    require(value, field).map(clamp01)
}

/// Clamp into [0,1], leaving NaN untouched
pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Linear rescale of the tempo reference range
pub fn normalize_tempo(bpm: f64) -> f64 {
    clamp01((bpm - TEMPO_RANGE_MIN_BPM) / (TEMPO_RANGE_MAX_BPM - TEMPO_RANGE_MIN_BPM))
}

/// Log-compressed spectral centroid
pub fn normalize_spectral_centroid(hz: f64) -> f64 {
    // f64::max would swallow NaN
    let hz = if hz < 0.0 { 0.0 } else { hz };
    clamp01((1.0 + hz).ln() / (1.0 + SPECTRAL_REFERENCE_HZ).ln())
}
