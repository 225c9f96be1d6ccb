//! Serialized contracts for downstream consumers
//!
//! **[MXC-EXP-010]** Persistence writes [`FingerprintRecord`]s and
//! [`ScoreRecord`]s; AI enrichment consumes [`EnrichmentPayload`]s. Every
//! record carries [`FINGERPRINT_FORMAT_VERSION`] so readers can reject
//! vectors built with a different dimension layout.
//!
//! **[MXC-EXP-020]** A stored fingerprint is not trusted on load:
//! [`FingerprintRecord::into_fingerprint`] yields a plain [`Fingerprint`]
//! that must pass the quality gate again before it can be scored.

use crate::batch::RejectedTrack;
use crate::compatibility::{CompatibilityScore, ScoreBreakdown};
use crate::error::{MixError, MixResult};
use crate::features::RawFeatures;
use crate::fingerprint::{Fingerprint, DIMENSION_COUNT};
use crate::matrix::MatrixView;
use crate::validators::{QualityGate, Validated};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dimension layout version written with every record
pub const FINGERPRINT_FORMAT_VERSION: &str = "3.0";

fn check_format_version(found: &str) -> MixResult<()> {
    if found != FINGERPRINT_FORMAT_VERSION {
        return Err(MixError::UnsupportedFormatVersion {
            found: found.to_string(),
            expected: FINGERPRINT_FORMAT_VERSION.to_string(),
        });
    }
    Ok(())
}

/// Persisted fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub format_version: String,
    pub track_id: String,
    pub values: Vec<f64>,
}

impl FingerprintRecord {
    pub fn from_validated(track_id: impl Into<String>, fingerprint: &Validated<Fingerprint>) -> Self {
        Self {
            format_version: FINGERPRINT_FORMAT_VERSION.to_string(),
            track_id: track_id.into(),
            values: fingerprint.values().to_vec(),
        }
    }

    /// Unvalidated fingerprint; fails on a format version mismatch
    pub fn into_fingerprint(self) -> MixResult<Fingerprint> {
        check_format_version(&self.format_version)?;
        Ok(Fingerprint::from_values(self.values))
    }

    /// Version check plus a fresh pass through the quality gate
    pub fn into_validated(self, gate: &QualityGate) -> MixResult<Validated<Fingerprint>> {
        let fingerprint = self.into_fingerprint()?;
        Ok(gate.admit(fingerprint)?)
    }
}

/// Fingerprint plus source features, handed to AI enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentPayload {
    pub format_version: String,
    pub track_id: String,
    /// Dimension order
    pub fingerprint: [f64; DIMENSION_COUNT],
    pub features: RawFeatures,
}

impl EnrichmentPayload {
    pub fn new(
        track_id: impl Into<String>,
        fingerprint: &Validated<Fingerprint>,
        features: RawFeatures,
    ) -> Self {
        Self {
            format_version: FINGERPRINT_FORMAT_VERSION.to_string(),
            track_id: track_id.into(),
            fingerprint: fingerprint.to_array(),
            features,
        }
    }
}

/// Persisted pair score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub format_version: String,
    pub track_a: String,
    pub track_b: String,
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
    pub computed_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Record stamped with the current time
    pub fn new(
        track_a: impl Into<String>,
        track_b: impl Into<String>,
        score: &CompatibilityScore,
    ) -> Self {
        Self::at(track_a, track_b, score, Utc::now())
    }

    pub fn at(
        track_a: impl Into<String>,
        track_b: impl Into<String>,
        score: &CompatibilityScore,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            format_version: FINGERPRINT_FORMAT_VERSION.to_string(),
            track_a: track_a.into(),
            track_b: track_b.into(),
            overall: score.overall,
            breakdown: score.breakdown,
            computed_at,
        }
    }

    /// Score back out of the record; fails on a format version mismatch
    pub fn into_score(self) -> MixResult<CompatibilityScore> {
        check_format_version(&self.format_version)?;
        Ok(CompatibilityScore {
            overall: self.overall,
            breakdown: self.breakdown,
        })
    }
}

/// Batch report written by the `wkmp-mc` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixReport {
    pub format_version: String,
    pub generated_at: DateTime<Utc>,
    pub matrix: MatrixView,
    pub rejected: Vec<RejectedTrack>,
}

impl MixReport {
    pub fn new(matrix: MatrixView, rejected: Vec<RejectedTrack>) -> Self {
        Self {
            format_version: FINGERPRINT_FORMAT_VERSION.to_string(),
            generated_at: Utc::now(),
            matrix,
            rejected,
        }
    }
}
