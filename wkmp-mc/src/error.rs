//! Error types for wkmp-mc
//!
//! **[MXC-ERR-010]** Per-track failures (`NormalizationError`,
//! `ValidationError`) are fatal for that track only; the batch excludes the
//! track and reports it. Nothing is retried: every operation is a
//! deterministic pure function.

use crate::normalizer::NormalizationError;
use crate::validators::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a track was excluded from scoring
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "stage", content = "detail", rename_all = "snake_case")]
pub enum TrackRejection {
    /// Raw features could not be normalized
    #[error("normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    /// Fingerprint failed the quality gate (every issue listed)
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Errors loading stored records
#[derive(Debug, Error)]
pub enum MixError {
    /// Stored fingerprint no longer passes the quality gate
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stored record written with an incompatible fingerprint layout
    #[error("Unsupported fingerprint format version '{found}' (expected '{expected}')")]
    UnsupportedFormatVersion { found: String, expected: String },
}

/// Result type for record loading
pub type MixResult<T> = Result<T, MixError>;
