//! Compatibility Engine
//!
//! Scores how well two tracks mix by combining DJ-mixing rules with
//! fingerprint similarity.
//!
//! # Components
//! - **Tempo:** `1 - min(Δbpm / tolerance, 1)`; with double-time matching,
//!   Δbpm is the smallest of the direct, double and half tempo deltas
//! - **Key:** harmonic wheel distance → same 1.0 / adjacent 0.8 /
//!   two steps 0.4 / otherwise 0.0
//! - **Energy:** `1 - |energy_a - energy_b|`, inverted when a requested
//!   energy curve is contradicted by the observed delta
//! - **Fingerprint:** [`SimilarityScorer`] output
//!
//! # Blend
//! `overall = 0.6 × traditional_avg + 0.4 × fingerprint_similarity` where
//! `traditional_avg` is the mean of tempo, key and energy. The split is
//! configurable through [`BlendWeights`](crate::config::BlendWeights).
//!
//! Only [`TrackContext`]s can be scored, and a `TrackContext` only holds a
//! `Validated<Fingerprint>`: rejected fingerprints cannot reach this module.

use crate::config::ScoringConfig;
use crate::features::{FeatureField, RawFeatures};
use crate::fingerprint::Fingerprint;
use crate::key::MusicalKey;
use crate::normalizer::{clamp01, NormalizationError};
use crate::similarity::SimilarityScorer;
use crate::validators::Validated;
use serde::{Deserialize, Serialize};
use tracing::trace;
use wkmp_common::Result;

/// Requested energy direction for a transition from track A to track B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCurve {
    /// Energy should rise into the next track
    Ascending,
    /// Energy should fall into the next track
    Descending,
    /// Energy should hold; smoothness alone is rewarded
    Plateau,
}

impl EnergyCurve {
    /// Whether an observed delta (`energy_b - energy_a`) goes against the intent
    pub fn is_contradicted_by(&self, delta: f64) -> bool {
        match self {
            EnergyCurve::Ascending => delta < 0.0,
            EnergyCurve::Descending => delta > 0.0,
            EnergyCurve::Plateau => false,
        }
    }
}

/// Everything the engine needs to know about one track
///
/// Bundles the validated fingerprint with the raw tempo, key and energy
/// that rule-based scoring needs. Fields are private so the invariants
/// checked at construction (finite positive tempo, finite energy clamped to
/// [0,1], finite positive duration) hold for every scored pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackContext {
    track_id: String,
    fingerprint: Validated<Fingerprint>,
    tempo_bpm: f64,
    key: MusicalKey,
    energy: f64,
    duration_secs: Option<f64>,
}

impl TrackContext {
    pub fn new(
        track_id: impl Into<String>,
        fingerprint: Validated<Fingerprint>,
        tempo_bpm: f64,
        key: MusicalKey,
        energy: f64,
    ) -> std::result::Result<Self, NormalizationError> {
        if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
            return Err(NormalizationError::InvalidValue {
                field: FeatureField::Tempo,
                value: tempo_bpm,
            });
        }
        if !energy.is_finite() {
            return Err(NormalizationError::InvalidValue {
                field: FeatureField::Energy,
                value: energy,
            });
        }

        Ok(Self {
            track_id: track_id.into(),
            fingerprint,
            tempo_bpm,
            key,
            energy: clamp01(energy),
            duration_secs: None,
        })
    }

    /// Build from the raw features the fingerprint was derived from
    pub fn from_features(
        track_id: impl Into<String>,
        features: &RawFeatures,
        fingerprint: Validated<Fingerprint>,
    ) -> std::result::Result<Self, NormalizationError> {
        let tempo_bpm = features
            .tempo
            .ok_or(NormalizationError::MissingFeature(FeatureField::Tempo))?;
        let key = features
            .key
            .ok_or(NormalizationError::MissingFeature(FeatureField::Key))?;
        let energy = features
            .energy
            .ok_or(NormalizationError::MissingFeature(FeatureField::Energy))?;

        let track = Self::new(track_id, fingerprint, tempo_bpm, key, energy)?;
        match features.duration {
            Some(duration) => track.with_duration(duration),
            None => Ok(track),
        }
    }

    /// Attach a track length; must be finite and positive
    pub fn with_duration(
        mut self,
        duration_secs: f64,
    ) -> std::result::Result<Self, NormalizationError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(NormalizationError::InvalidValue {
                field: FeatureField::Duration,
                value: duration_secs,
            });
        }
        self.duration_secs = Some(duration_secs);
        Ok(self)
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn fingerprint(&self) -> &Validated<Fingerprint> {
        &self.fingerprint
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn key(&self) -> MusicalKey {
        self.key
    }

    /// Energy in [0,1]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Track length in seconds, when known
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }
}

/// Per-component breakdown of a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub tempo_component: f64,
    pub key_component: f64,
    pub energy_component: f64,
    pub fingerprint_similarity: f64,
}

impl ScoreBreakdown {
    /// Mean of the rule-based components
    pub fn traditional_avg(&self) -> f64 {
        (self.tempo_component + self.key_component + self.energy_component) / 3.0
    }
}

/// Final compatibility score in [0,1] with its breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
}

impl CompatibilityScore {
    /// Self-compatibility (matrix diagonal): every component 1.0
    pub fn identity() -> Self {
        Self {
            overall: 1.0,
            breakdown: ScoreBreakdown {
                tempo_component: 1.0,
                key_component: 1.0,
                energy_component: 1.0,
                fingerprint_similarity: 1.0,
            },
        }
    }
}

/// Compatibility Engine
///
/// Stateless per call; holds only immutable configuration.
#[derive(Debug, Clone)]
pub struct CompatibilityEngine {
    config: ScoringConfig,
    similarity: SimilarityScorer,
}

impl CompatibilityEngine {
    /// Create engine from a validated scoring config
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            similarity: SimilarityScorer::new(),
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a pair with no energy-curve intent (symmetric)
    pub fn score(&self, a: &TrackContext, b: &TrackContext) -> CompatibilityScore {
        self.score_with_intent(a, b, None)
    }

    /// Score the transition A → B, optionally shaped by an energy intent
    pub fn score_with_intent(
        &self,
        a: &TrackContext,
        b: &TrackContext,
        intent: Option<EnergyCurve>,
    ) -> CompatibilityScore {
        let breakdown = ScoreBreakdown {
            tempo_component: self.tempo_component(a.tempo_bpm(), b.tempo_bpm()),
            key_component: self.key_component(&a.key(), &b.key()),
            energy_component: energy_component(a.energy(), b.energy(), intent),
            fingerprint_similarity: self.similarity.similarity(a.fingerprint(), b.fingerprint()),
        };

        let overall = clamp01(
            self.config
                .blend
                .combine(breakdown.traditional_avg(), breakdown.fingerprint_similarity),
        );

        trace!(
            track_a = %a.track_id(),
            track_b = %b.track_id(),
            overall,
            tempo = breakdown.tempo_component,
            key = breakdown.key_component,
            energy = breakdown.energy_component,
            fingerprint = breakdown.fingerprint_similarity,
            "Pair scored"
        );

        CompatibilityScore { overall, breakdown }
    }

    /// Tempo compatibility in [0,1]
    pub fn tempo_component(&self, bpm_a: f64, bpm_b: f64) -> f64 {
        let mut delta = (bpm_a - bpm_b).abs();
        if self.config.double_time_matching {
            delta = delta
                .min((bpm_a - 2.0 * bpm_b).abs())
                .min((2.0 * bpm_a - bpm_b).abs());
        }
        1.0 - (delta / self.config.tempo_tolerance_bpm).min(1.0)
    }

    /// Harmonic compatibility in [0,1]
    pub fn key_component(&self, a: &MusicalKey, b: &MusicalKey) -> f64 {
        self.config.key.for_distance(a.harmonic_distance(b))
    }
}

impl Default for CompatibilityEngine {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
            similarity: SimilarityScorer::new(),
        }
    }
}

/// Energy-flow compatibility in [0,1]
pub fn energy_component(energy_a: f64, energy_b: f64, intent: Option<EnergyCurve>) -> f64 {
    let delta = energy_b - energy_a;
    let smoothness = clamp01(1.0 - delta.abs());
    match intent {
        Some(curve) if curve.is_contradicted_by(delta) => 1.0 - smoothness,
        _ => smoothness,
    }
}
