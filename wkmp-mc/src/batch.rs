//! Fingerprint pipeline and batch preparation
//!
//! Runs raw features → FeatureNormalizer → VectorBuilder → QualityGate for
//! each track. Failures are isolated per track: the batch continues and the
//! failed track is returned in the rejection list with its full reason, so
//! the caller decides whether a partial matrix is acceptable.

use crate::compatibility::TrackContext;
use crate::error::TrackRejection;
use crate::features::{RawFeatures, TrackFeatures};
use crate::fingerprint::{DimensionWeights, Fingerprint, VectorBuilder};
use crate::normalizer::FeatureNormalizer;
use crate::validators::{QualityGate, Validated};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wkmp_common::Result;

/// Track excluded from scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedTrack {
    pub track_id: String,
    pub reason: TrackRejection,
}

/// Outcome of preparing a batch
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    /// Accepted tracks in input order
    pub tracks: Vec<TrackContext>,
    /// Excluded tracks in input order
    pub rejected: Vec<RejectedTrack>,
}

/// Normalize → build → validate, for one track or many
#[derive(Debug, Clone, Default)]
pub struct FingerprintPipeline {
    normalizer: FeatureNormalizer,
    builder: VectorBuilder,
    gate: QualityGate,
}

impl FingerprintPipeline {
    /// Create pipeline with a custom weight table
    pub fn new(weights: DimensionWeights) -> Result<Self> {
        Ok(Self {
            normalizer: FeatureNormalizer::new(),
            builder: VectorBuilder::new(weights)?,
            gate: QualityGate::new(),
        })
    }

    /// Unvalidated fingerprint (for persistence diagnostics)
    pub fn build(&self, raw: &RawFeatures) -> std::result::Result<Fingerprint, TrackRejection> {
        let normalized = self.normalizer.normalize(raw)?;
        Ok(self.builder.build(normalized))
    }

    /// Fingerprint that passed the quality gate
    pub fn fingerprint(
        &self,
        raw: &RawFeatures,
    ) -> std::result::Result<Validated<Fingerprint>, TrackRejection> {
        let fingerprint = self.build(raw)?;
        Ok(self.gate.admit(fingerprint)?)
    }

    /// Scoring context for one track
    pub fn prepare(&self, input: &TrackFeatures) -> std::result::Result<TrackContext, TrackRejection> {
        let fingerprint = self.fingerprint(&input.features)?;
        Ok(TrackContext::from_features(
            input.track_id.clone(),
            &input.features,
            fingerprint,
        )?)
    }

    /// Prepare every track in parallel, isolating failures
    pub fn prepare_tracks(&self, inputs: &[TrackFeatures]) -> PreparedBatch {
        let results: Vec<(String, std::result::Result<TrackContext, TrackRejection>)> = inputs
            .par_iter()
            .map(|input| (input.track_id.clone(), self.prepare(input)))
            .collect();

        let mut batch = PreparedBatch::default();
        for (track_id, result) in results {
            match result {
                Ok(track) => batch.tracks.push(track),
                Err(reason) => {
                    warn!(track_id = %track_id, %reason, "Track excluded from scoring");
                    batch.rejected.push(RejectedTrack { track_id, reason });
                }
            }
        }

        info!(
            accepted = batch.tracks.len(),
            rejected = batch.rejected.len(),
            "Batch preparation complete"
        );
        batch
    }
}
