//! Pluggable scoring signals layered on top of the compatibility engine
//!
//! The engine's blend is fixed to two factors (traditional rules vs
//! fingerprint). Extra signals such as cultural context or lyric similarity
//! are layered here instead: the engine's overall score and each signal are
//! combined by weighted average, and signals with no opinion on a pair
//! (`None`) drop out of that pair's average.

use crate::compatibility::{CompatibilityEngine, CompatibilityScore, EnergyCurve, TrackContext};
use crate::normalizer::clamp01;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wkmp_common::{Error, Result};

/// Additional pairwise compatibility signal
pub trait ScoringSignal: Send + Sync {
    /// Signal name for provenance in the layered score
    fn name(&self) -> &'static str;

    /// Relative weight against the engine score (which has weight 1.0)
    fn weight(&self) -> f64;

    /// Score in [0,1], or `None` when the signal has no data for this pair
    fn score(&self, a: &TrackContext, b: &TrackContext) -> Option<f64>;
}

/// One signal's contribution to a layered score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    pub weight: f64,
    pub score: f64,
}

/// Engine score plus layered signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredScore {
    /// Weighted average of the engine score and contributing signals
    pub overall: f64,
    /// Untouched engine result
    pub base: CompatibilityScore,
    pub signals: Vec<SignalContribution>,
}

/// Combines `CompatibilityEngine` output with additional signals
pub struct LayeredScorer {
    engine: CompatibilityEngine,
    signals: Vec<Box<dyn ScoringSignal>>,
}

impl LayeredScorer {
    pub fn new(engine: CompatibilityEngine) -> Self {
        Self {
            engine,
            signals: Vec::new(),
        }
    }

    /// Register a signal; its weight must be finite and non-negative
    pub fn with_signal(mut self, signal: Box<dyn ScoringSignal>) -> Result<Self> {
        let weight = signal.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidInput(format!(
                "signal '{}' has invalid weight {}",
                signal.name(),
                weight
            )));
        }
        self.signals.push(signal);
        Ok(self)
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub fn score(&self, a: &TrackContext, b: &TrackContext) -> LayeredScore {
        self.score_with_intent(a, b, None)
    }

    pub fn score_with_intent(
        &self,
        a: &TrackContext,
        b: &TrackContext,
        intent: Option<EnergyCurve>,
    ) -> LayeredScore {
        let base = self.engine.score_with_intent(a, b, intent);

        let signals: Vec<SignalContribution> = self
            .signals
            .iter()
            .filter_map(|signal| {
                signal.score(a, b).map(|score| SignalContribution {
                    name: signal.name().to_string(),
                    weight: signal.weight(),
                    score: clamp01(score),
                })
            })
            .collect();

        let weight_sum: f64 = 1.0 + signals.iter().map(|s| s.weight).sum::<f64>();
        let weighted: f64 =
            base.overall + signals.iter().map(|s| s.weight * s.score).sum::<f64>();
        let overall = clamp01(weighted / weight_sum);

        debug!(
            base = base.overall,
            layered = overall,
            contributing_signals = signals.len(),
            "Layered score computed"
        );

        LayeredScore {
            overall,
            base,
            signals,
        }
    }
}

/// Rewards tracks of similar length
///
/// `1 - |Δduration| / max(duration)`; no opinion when either duration is
/// unknown.
#[derive(Debug, Clone, Copy)]
pub struct DurationSignal {
    weight: f64,
}

impl DurationSignal {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for DurationSignal {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl ScoringSignal for DurationSignal {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, a: &TrackContext, b: &TrackContext) -> Option<f64> {
        let (da, db) = (a.duration_secs()?, b.duration_secs()?);
        let longest = da.max(db);
        if longest <= 0.0 {
            return None;
        }
        Some(clamp01(1.0 - (da - db).abs() / longest))
    }
}
