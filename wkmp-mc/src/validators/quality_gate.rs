//! Quality Gate
//!
//! Validates fingerprints before they are trusted by storage or scoring.
//!
//! # Checks (always all three, in order)
//! 1. **Dimensionality:** length must be exactly 12 → `DimensionMismatch`
//! 2. **Numeric sanity:** no NaN/Infinity → `NonFiniteValue(index)`
//! 3. **Range:** every finite component in [0,1] → `OutOfRange(index, value)`
//!
//! Every violation is reported, not just the first, so callers can log a
//! complete diagnosis.
//!
//! # Validated boundary
//! `Validated<Fingerprint>` can only be produced by [`QualityGate::admit`].
//! Similarity and compatibility scoring accept nothing else, so an
//! unvalidated fingerprint reaching the scorers is a type error.
//!
//! # Example
//! ```rust
//! use wkmp_mc::fingerprint::Fingerprint;
//! use wkmp_mc::validators::{QualityGate, ValidationIssue};
//!
//! let gate = QualityGate::new();
//! let mut values = vec![0.5; 12];
//! values[5] = f64::NAN;
//!
//! let err = gate.admit(Fingerprint::from_values(values)).unwrap_err();
//! assert_eq!(err.issues, vec![ValidationIssue::NonFiniteValue(5)]);
//! ```

use crate::fingerprint::{Fingerprint, DIMENSION_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use thiserror::Error;
use tracing::debug;

/// A single quality-gate violation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Wrong number of components
    DimensionMismatch { expected: usize, actual: usize },
    /// NaN or ±Infinity at index
    NonFiniteValue(usize),
    /// Finite component outside [0,1]
    OutOfRange(usize, f64),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DimensionMismatch { expected, actual } => {
                write!(f, "dimension mismatch: expected {}, got {}", expected, actual)
            }
            ValidationIssue::NonFiniteValue(index) => {
                write!(f, "non-finite value at index {}", index)
            }
            ValidationIssue::OutOfRange(index, value) => {
                write!(f, "value {} at index {} outside [0,1]", value, index)
            }
        }
    }
}

/// Quality gate rejection carrying every violation found
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("Fingerprint rejected ({} issue(s)): {}", .issues.len(), format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Value that has passed the quality gate
///
/// The inner field is private to this module: the only way to construct one
/// is a successful [`QualityGate::admit`]. Serializes as the inner value;
/// deliberately not `Deserialize` (loaded data must pass the gate again).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    pub fn inner(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> AsRef<T> for Validated<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl Validated<Fingerprint> {
    /// Components as a fixed-size array (length is guaranteed by the gate)
    pub fn to_array(&self) -> [f64; DIMENSION_COUNT] {
        let mut out = [0.0; DIMENSION_COUNT];
        out.copy_from_slice(self.0.values());
        out
    }
}

/// Quality Gate
///
/// Stateless validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityGate;

impl QualityGate {
    pub fn new() -> Self {
        Self
    }

    /// Run all checks, reporting every violation
    pub fn validate(&self, fp: &Fingerprint) -> Result<(), ValidationError> {
        let issues = inspect(fp.values());
        if issues.is_empty() {
            Ok(())
        } else {
            debug!(issue_count = issues.len(), "Fingerprint failed quality gate");
            Err(ValidationError { issues })
        }
    }

    /// Validate and wrap; the sole constructor of `Validated<Fingerprint>`
    pub fn admit(&self, fp: Fingerprint) -> Result<Validated<Fingerprint>, ValidationError> {
        self.validate(&fp)?;
        Ok(Validated(fp))
    }
}

fn inspect(values: &[f64]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // Check 1: dimensionality
    if values.len() != DIMENSION_COUNT {
        issues.push(ValidationIssue::DimensionMismatch {
            expected: DIMENSION_COUNT,
            actual: values.len(),
        });
    }

    // Check 2: numeric sanity
    issues.extend(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_finite())
            .map(|(i, _)| ValidationIssue::NonFiniteValue(i)),
    );

    // Check 3: range (non-finite values already reported above)
    issues.extend(
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite() && !(0.0..=1.0).contains(*v))
            .map(|(i, v)| ValidationIssue::OutOfRange(i, *v)),
    );

    issues
}
