//! Validation layer
//!
//! The quality gate is the trust boundary between fingerprint construction
//! and everything that stores or compares fingerprints.

pub mod quality_gate;

pub use quality_gate::{QualityGate, Validated, ValidationError, ValidationIssue};
