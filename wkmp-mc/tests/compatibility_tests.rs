//! Mix Compatibility Integration Tests
//! Test File: compatibility_tests.rs
//! Requirement: MXC-CMP-010 (Pipeline from raw features to compatibility matrix)
//!
//! Drives the public API end to end: raw features → fingerprint → quality
//! gate → engine → matrix.

use wkmp_mc::signals::{DurationSignal, LayeredScorer};
use wkmp_mc::{
    BatchCompatibilityMatrix, CompatibilityEngine, EnergyCurve, Fingerprint, FingerprintPipeline,
    MusicalKey, QualityGate, RawFeatures, TrackFeatures, TrackRejection, ValidationIssue,
};

/// Helper: complete feature set with the rule-relevant fields varied
fn features(tempo: f64, key: &str, energy: f64) -> RawFeatures {
    RawFeatures {
        tempo: Some(tempo),
        key: Some(key.parse().unwrap()),
        energy: Some(energy),
        spectral_centroid: Some(2200.0),
        dynamic_range: Some(0.45),
        acousticness: Some(0.05),
        danceability: Some(0.8),
        valence: Some(0.6),
        instrumentalness: Some(0.7),
        harmonic_complexity: Some(0.35),
        tempo_stability: Some(0.95),
        rhythmic_pattern: Some(0.65),
        duration: Some(360.0),
    }
}

fn key(label: &str) -> MusicalKey {
    label.parse().unwrap()
}

// =============================================================================
// End-to-end scoring
// =============================================================================

/// TC-CMP-001: Relative keys at matching tempo mix well
#[test]
fn tc_cmp_001_end_to_end_relative_keys() {
    // Given: Am and C at 128 BPM with energies 0.75 / 0.70
    let pipeline = FingerprintPipeline::default();
    let a = pipeline
        .prepare(&TrackFeatures::new("a", features(128.0, "Am", 0.75)))
        .unwrap();
    let b = pipeline
        .prepare(&TrackFeatures::new("b", features(128.0, "C", 0.70)))
        .unwrap();

    // When: Scored with default policy
    let score = CompatibilityEngine::default().score(&a, &b);

    // Then: Each component matches the DJ rules and the blend clears 0.85
    assert_eq!(score.breakdown.key_component, 0.8);
    assert_eq!(score.breakdown.tempo_component, 1.0);
    assert!((score.breakdown.energy_component - 0.95).abs() < 1e-9);
    assert!(score.breakdown.fingerprint_similarity > 0.9);
    assert!(score.overall >= 0.85, "overall was {}", score.overall);
    assert!(score.overall <= 1.0);
}

/// TC-CMP-002: Self-compatibility is exactly 1.0
#[test]
fn tc_cmp_002_self_compatibility() {
    let pipeline = FingerprintPipeline::default();
    let a = pipeline
        .prepare(&TrackFeatures::new("a", features(93.0, "F#m", 0.4)))
        .unwrap();
    let score = CompatibilityEngine::default().score(&a, &a);
    assert_eq!(score.overall, 1.0);
    assert_eq!(score.breakdown.fingerprint_similarity, 1.0);
}

/// TC-CMP-003: Scores are symmetric and bounded without an energy intent
#[test]
fn tc_cmp_003_symmetry_and_range() {
    let pipeline = FingerprintPipeline::default();
    let engine = CompatibilityEngine::default();
    let inputs = [
        ("a", 70.0, "C", 0.1),
        ("b", 128.0, "Bbm", 0.9),
        ("c", 174.0, "E", 0.5),
        ("d", 87.0, "Ebm", 0.0),
    ];
    let tracks: Vec<_> = inputs
        .iter()
        .map(|(id, bpm, k, e)| {
            pipeline
                .prepare(&TrackFeatures::new(*id, features(*bpm, k, *e)))
                .unwrap()
        })
        .collect();

    for a in &tracks {
        for b in &tracks {
            let ab = engine.score(a, b);
            let ba = engine.score(b, a);
            assert_eq!(ab, ba);
            assert!((0.0..=1.0).contains(&ab.overall));
        }
    }
}

/// TC-CMP-004: Energy intent shapes direction-sensitive scoring
#[test]
fn tc_cmp_004_energy_intent() {
    let pipeline = FingerprintPipeline::default();
    let engine = CompatibilityEngine::default();
    let calm = pipeline
        .prepare(&TrackFeatures::new("calm", features(124.0, "8A", 0.3)))
        .unwrap();
    let peak = pipeline
        .prepare(&TrackFeatures::new("peak", features(124.0, "8A", 0.8)))
        .unwrap();

    let rising = engine.score_with_intent(&calm, &peak, Some(EnergyCurve::Ascending));
    let against = engine.score_with_intent(&calm, &peak, Some(EnergyCurve::Descending));

    assert!((rising.breakdown.energy_component - 0.5).abs() < 1e-9);
    assert!((against.breakdown.energy_component - 0.5).abs() < 1e-9);

    let falling = engine.score_with_intent(&peak, &calm, Some(EnergyCurve::Ascending));
    let gentle_rise = pipeline
        .prepare(&TrackFeatures::new("warm", features(124.0, "8A", 0.4)))
        .unwrap();
    let small_up = engine.score_with_intent(&calm, &gentle_rise, Some(EnergyCurve::Ascending));
    let small_down = engine.score_with_intent(&gentle_rise, &calm, Some(EnergyCurve::Ascending));
    assert!((small_up.breakdown.energy_component - 0.9).abs() < 1e-9);
    assert!((small_down.breakdown.energy_component - 0.1).abs() < 1e-9);
    assert!(small_up.overall > small_down.overall);
    assert!(falling.overall <= 1.0);
}

// =============================================================================
// DJ rule properties
// =============================================================================

/// TC-CMP-005: Tempo rules including double/half time
#[test]
fn tc_cmp_005_tempo_rules() {
    let engine = CompatibilityEngine::default();
    assert!((engine.tempo_component(120.0, 120.5) - 0.975).abs() < 1e-12);
    assert_eq!(engine.tempo_component(120.0, 240.0), 1.0);
    assert_eq!(engine.tempo_component(120.0, 60.0), 1.0);
    assert_eq!(engine.tempo_component(90.0, 140.0), 0.0);
}

/// TC-CMP-006: Harmonic wheel rules
#[test]
fn tc_cmp_006_key_rules() {
    let engine = CompatibilityEngine::default();
    assert_eq!(engine.key_component(&key("Am"), &key("Am")), 1.0);
    assert_eq!(engine.key_component(&key("Am"), &key("Em")), 0.8);
    assert_eq!(engine.key_component(&key("Am"), &key("Dm")), 0.8);
    assert_eq!(engine.key_component(&key("Am"), &key("C")), 0.8);
    // Opposite side of the wheel
    assert_eq!(engine.key_component(&key("8A"), &key("2A")), 0.0);
    assert_eq!(engine.key_component(&key("8B"), &key("2B")), 0.0);
}

// =============================================================================
// Quality gate and batch
// =============================================================================

/// TC-CMP-007: NaN in dimension 5 is rejected and excluded from the matrix
#[test]
fn tc_cmp_007_nan_excluded_from_matrix() {
    // Given: Three tracks, one with NaN energy (dimension 5)
    let mut broken = features(126.0, "Am", 0.5);
    broken.energy = Some(f64::NAN);
    let inputs = vec![
        TrackFeatures::new("good-1", features(126.0, "Am", 0.5)),
        TrackFeatures::new("nan", broken),
        TrackFeatures::new("good-2", features(128.0, "Em", 0.6)),
    ];

    // When: Batch is prepared and the matrix built
    let batch = FingerprintPipeline::default().prepare_tracks(&inputs);
    let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&batch.tracks);

    // Then: NaN track rejected with NonFiniteValue(5), matrix covers the rest
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].track_id, "nan");
    match &batch.rejected[0].reason {
        TrackRejection::Validation(err) => {
            assert_eq!(err.issues, vec![ValidationIssue::NonFiniteValue(5)])
        }
        other => panic!("expected validation rejection, got {:?}", other),
    }
    assert_eq!(matrix.track_ids(), ["good-1".to_string(), "good-2".to_string()]);
    assert_eq!(matrix.index_of("nan"), None);
}

/// TC-CMP-008: Gate reports every violated dimension
#[test]
fn tc_cmp_008_gate_reports_all_issues() {
    let mut values = vec![0.5; 12];
    values[0] = f64::NAN;
    values[3] = -0.2;
    values[7] = f64::INFINITY;
    values[11] = 1.5;

    let err = QualityGate::new()
        .admit(Fingerprint::from_values(values))
        .unwrap_err();

    assert_eq!(
        err.issues,
        vec![
            ValidationIssue::NonFiniteValue(0),
            ValidationIssue::NonFiniteValue(7),
            ValidationIssue::OutOfRange(3, -0.2),
            ValidationIssue::OutOfRange(11, 1.5),
        ]
    );
}

/// TC-CMP-009: Matrix is symmetric with unit diagonal and ranks neighbours
#[test]
fn tc_cmp_009_matrix_properties() {
    let inputs = vec![
        TrackFeatures::new("opener", features(122.0, "8A", 0.4)),
        TrackFeatures::new("builder", features(124.0, "9A", 0.55)),
        TrackFeatures::new("peak", features(126.0, "9B", 0.85)),
        TrackFeatures::new("outlier", features(85.0, "3B", 0.1)),
    ];
    let batch = FingerprintPipeline::default().prepare_tracks(&inputs);
    assert!(batch.rejected.is_empty());

    let matrix = BatchCompatibilityMatrix::with_worker_threads(CompatibilityEngine::default(), 3)
        .unwrap()
        .build(&batch.tracks);

    let n = matrix.len();
    assert_eq!(n, 4);
    for i in 0..n {
        assert_eq!(matrix.score(i, i), Some(1.0));
        for j in 0..n {
            assert_eq!(matrix.score(i, j), matrix.score(j, i));
        }
    }

    let outlier = matrix.index_of("outlier").unwrap();
    let ranked = matrix.best_matches(matrix.index_of("opener").unwrap(), 3);
    assert_eq!(ranked.last().map(|(j, _)| *j), Some(outlier));
}

// =============================================================================
// Layered signals
// =============================================================================

/// TC-CMP-010: Duration signal layers on top of the engine score
#[test]
fn tc_cmp_010_layered_duration_signal() {
    let pipeline = FingerprintPipeline::default();
    let mut short = features(128.0, "Am", 0.7);
    short.duration = Some(180.0);
    let a = pipeline.prepare(&TrackFeatures::new("long", features(128.0, "Am", 0.7))).unwrap();
    let b = pipeline.prepare(&TrackFeatures::new("short", short)).unwrap();

    let scorer = LayeredScorer::new(CompatibilityEngine::default())
        .with_signal(Box::new(DurationSignal::new(1.0)))
        .unwrap();
    let layered = scorer.score(&a, &b);

    // 360s vs 180s → duration similarity 0.5
    assert_eq!(layered.signals.len(), 1);
    assert_eq!(layered.signals[0].score, 0.5);
    assert!((layered.overall - (layered.base.overall + 0.5) / 2.0).abs() < 1e-12);
}
