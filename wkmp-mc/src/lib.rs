//! wkmp-mc - Mix Compatibility Engine
//!
//! **[MXC-OV-010]** Turns per-track audio features into fixed-length
//! fingerprints and scores how well pairs of tracks mix, combining DJ rules
//! (tempo, harmonic key, energy flow) with fingerprint similarity.
//!
//! # Pipeline
//! ```text
//! RawFeatures → FeatureNormalizer → VectorBuilder → QualityGate
//!             → Validated<Fingerprint> → CompatibilityEngine
//!             → BatchCompatibilityMatrix
//! ```
//!
//! Everything is a pure function over immutable configuration; the only
//! concurrency is parallel pair scoring in [`matrix`].

pub mod batch;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod fingerprint;
pub mod key;
pub mod matrix;
pub mod normalizer;
pub mod signals;
pub mod similarity;
pub mod validators;

pub use crate::batch::{FingerprintPipeline, PreparedBatch, RejectedTrack};
pub use crate::compatibility::{
    CompatibilityEngine, CompatibilityScore, EnergyCurve, ScoreBreakdown, TrackContext,
};
pub use crate::config::MixConfig;
pub use crate::error::{MixError, MixResult, TrackRejection};
pub use crate::features::{RawFeatures, TrackFeatures};
pub use crate::fingerprint::{DimensionWeights, Fingerprint, VectorBuilder, DIMENSION_COUNT};
pub use crate::key::{Mode, MusicalKey};
pub use crate::matrix::{BatchCompatibilityMatrix, CompatibilityMatrix, MatrixView};
pub use crate::normalizer::{FeatureNormalizer, NormalizationError};
pub use crate::similarity::SimilarityScorer;
pub use crate::validators::{QualityGate, Validated, ValidationError, ValidationIssue};
