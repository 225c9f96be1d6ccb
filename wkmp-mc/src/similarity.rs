//! Similarity Scorer
//!
//! Symmetric [0,1] similarity between two validated fingerprints.
//!
//! # Algorithm
//! - Euclidean: `d = sqrt(Σ (a_i - b_i)²)`, `euclid_sim = 1 / (1 + d)`
//! - Cosine: `cos_sim = clamp01(a·b / (‖a‖ ‖b‖))`, 0 if either norm is 0
//! - Score: `(euclid_sim + cos_sim) / 2` (plain average; the importance
//!   weighting already lives inside the fingerprint)
//!
//! Identical fingerprints score exactly 1.0, including the all-zero
//! fingerprint whose cosine term is otherwise undefined.

use crate::fingerprint::Fingerprint;
use crate::normalizer::clamp01;
use crate::validators::Validated;

/// Breakdown of one similarity computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    pub euclidean_distance: f64,
    pub euclidean_similarity: f64,
    pub cosine_similarity: f64,
    pub score: f64,
}

/// Similarity Scorer
///
/// Stateless; safe to share across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Blended similarity in [0,1]
    pub fn similarity(&self, a: &Validated<Fingerprint>, b: &Validated<Fingerprint>) -> f64 {
        self.breakdown(a, b).score
    }

    /// Similarity with its component metrics
    pub fn breakdown(
        &self,
        a: &Validated<Fingerprint>,
        b: &Validated<Fingerprint>,
    ) -> SimilarityBreakdown {
        let (a, b) = (a.values(), b.values());

        if a == b {
            return SimilarityBreakdown {
                euclidean_distance: 0.0,
                euclidean_similarity: 1.0,
                cosine_similarity: 1.0,
                score: 1.0,
            };
        }

        let euclidean_distance = euclidean_distance(a, b);
        let euclidean_similarity = 1.0 / (1.0 + euclidean_distance);
        let cosine_similarity = cosine_similarity(a, b);
        let score = clamp01((euclidean_similarity + cosine_similarity) / 2.0);

        SimilarityBreakdown {
            euclidean_distance,
            euclidean_similarity,
            cosine_similarity,
            score,
        }
    }
}

/// Euclidean (L2) distance
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity clamped to [0,1]; 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    clamp01(dot_product / (norm_a * norm_b))
}
