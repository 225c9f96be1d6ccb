//! Batch Compatibility Matrix
//!
//! Pairwise compatibility over a track set.
//!
//! # Concurrency
//! Rows of the upper triangle are scored in parallel on a rayon pool. Each
//! worker owns one row `i` and computes cells `(i, j)` for `j > i` only, so
//! no cell is written twice and no locking is needed. The `collect()` is the
//! barrier: assembly (mirroring into `(j, i)` and filling the diagonal)
//! starts only after every row is complete.
//!
//! Exactly N(N−1)/2 pairs are scored; mirror entries are copies.

use crate::compatibility::{CompatibilityEngine, CompatibilityScore, TrackContext};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, info};
use wkmp_common::{Error, Result};

/// Immutable N×N compatibility snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityMatrix {
    track_ids: Vec<String>,
    /// Row-major N×N cells
    cells: Vec<CompatibilityScore>,
}

impl CompatibilityMatrix {
    /// Number of tracks
    pub fn len(&self) -> usize {
        self.track_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty()
    }

    /// Track identifiers in row/column order
    pub fn track_ids(&self) -> &[String] {
        &self.track_ids
    }

    /// Full score for a cell
    pub fn get(&self, i: usize, j: usize) -> Option<&CompatibilityScore> {
        let n = self.len();
        if i >= n || j >= n {
            return None;
        }
        self.cells.get(i * n + j)
    }

    /// Overall score for a cell
    pub fn score(&self, i: usize, j: usize) -> Option<f64> {
        self.get(i, j).map(|s| s.overall)
    }

    /// Row/column index of a track identifier
    pub fn index_of(&self, track_id: &str) -> Option<usize> {
        self.track_ids.iter().position(|id| id == track_id)
    }

    /// Other tracks ranked by descending overall score (ties by index)
    pub fn best_matches(&self, index: usize, limit: usize) -> Vec<(usize, f64)> {
        let n = self.len();
        if index >= n {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = (0..n)
            .filter(|&j| j != index)
            .map(|j| (j, self.cells[index * n + j].overall))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        ranked
    }

    /// 2-D overall scores with the ordered track list, for UI/CLI display
    pub fn to_view(&self) -> MatrixView {
        let n = self.len();
        MatrixView {
            track_ids: self.track_ids.clone(),
            scores: (0..n)
                .map(|i| self.cells[i * n..(i + 1) * n].iter().map(|s| s.overall).collect())
                .collect(),
        }
    }
}

/// Display-oriented matrix: ordered ids plus overall scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixView {
    pub track_ids: Vec<String>,
    pub scores: Vec<Vec<f64>>,
}

/// Batch Compatibility Matrix builder
pub struct BatchCompatibilityMatrix {
    engine: CompatibilityEngine,
    pool: Option<rayon::ThreadPool>,
}

impl BatchCompatibilityMatrix {
    /// Use the global rayon pool
    pub fn new(engine: CompatibilityEngine) -> Self {
        Self { engine, pool: None }
    }

    /// Use a dedicated pool with `worker_threads` workers
    pub fn with_worker_threads(engine: CompatibilityEngine, worker_threads: usize) -> Result<Self> {
        if worker_threads == 0 {
            return Err(Error::Config("worker_threads must be at least 1".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("wkmp-mc-pair-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build worker pool: {}", e)))?;
        Ok(Self {
            engine,
            pool: Some(pool),
        })
    }

    pub fn engine(&self) -> &CompatibilityEngine {
        &self.engine
    }

    /// Score every unique pair and assemble the symmetric matrix
    pub fn build(&self, tracks: &[TrackContext]) -> CompatibilityMatrix {
        let n = tracks.len();
        let pair_count = n * n.saturating_sub(1) / 2;
        let started = Instant::now();
        debug!(tracks = n, pairs = pair_count, "Building compatibility matrix");

        let score = |a: &TrackContext, b: &TrackContext| self.engine.score(a, b);
        let upper = match &self.pool {
            Some(pool) => pool.install(|| score_upper_triangle(tracks, &score)),
            None => score_upper_triangle(tracks, &score),
        };

        let mut cells = vec![CompatibilityScore::identity(); n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                cells[i * n + j] = score;
                cells[j * n + i] = score;
            }
        }

        info!(
            tracks = n,
            pairs = pair_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Compatibility matrix complete"
        );

        CompatibilityMatrix {
            track_ids: tracks.iter().map(|t| t.track_id().to_string()).collect(),
            cells,
        }
    }

}

/// Row `i` holds scores for `(i, j)`, `j > i`
fn score_upper_triangle<F>(tracks: &[TrackContext], score: &F) -> Vec<Vec<CompatibilityScore>>
where
    F: Fn(&TrackContext, &TrackContext) -> CompatibilityScore + Sync,
{
    (0..tracks.len())
        .into_par_iter()
        .map(|i| {
            tracks[i + 1..]
                .iter()
                .map(|other| score(&tracks[i], other))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::validators::QualityGate;

    fn track(id: &str, tempo: f64, key: &str, energy: f64, level: f64) -> TrackContext {
        let fingerprint = QualityGate::new()
            .admit(Fingerprint::from_values(vec![level; 12]))
            .unwrap();
        TrackContext::new(id, fingerprint, tempo, key.parse().unwrap(), energy).unwrap()
    }

    fn tracks() -> Vec<TrackContext> {
        vec![
            track("t0", 120.0, "8A", 0.5, 0.5),
            track("t1", 122.0, "8B", 0.55, 0.45),
            track("t2", 90.0, "2A", 0.9, 0.1),
            track("t3", 60.0, "9A", 0.3, 0.6),
            track("t4", 174.0, "3B", 0.2, 0.9),
        ]
    }

    fn assert_symmetric_with_unit_diagonal(matrix: &CompatibilityMatrix) {
        let n = matrix.len();
        for i in 0..n {
            assert_eq!(matrix.score(i, i), Some(1.0));
            for j in 0..n {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.to_view().scores, Vec::<Vec<f64>>::new());
    }

    #[test]
    fn test_single_track() {
        let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default())
            .build(&tracks()[..1]);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.score(0, 0), Some(1.0));
        assert_symmetric_with_unit_diagonal(&matrix);
    }

    #[test]
    fn test_symmetry_and_diagonal_for_each_size() {
        let all = tracks();
        let builder = BatchCompatibilityMatrix::new(CompatibilityEngine::default());
        for n in 1..=all.len() {
            let matrix = builder.build(&all[..n]);
            assert_eq!(matrix.len(), n);
            assert_symmetric_with_unit_diagonal(&matrix);
        }
    }

    #[test]
    fn test_cells_match_direct_scoring() {
        let all = tracks();
        let engine = CompatibilityEngine::default();
        let matrix = BatchCompatibilityMatrix::new(engine.clone()).build(&all);
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_eq!(matrix.get(i, j), Some(&engine.score(&all[i], &all[j])));
            }
        }
    }

    #[test]
    fn test_each_pair_scored_once() {
        use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
        use std::sync::Mutex;

        let all = tracks();
        let engine = CompatibilityEngine::default();
        for n in 0..=all.len() {
            let calls = AtomicUsize::new(0);
            let seen = Mutex::new(Vec::new());
            let counting = |a: &TrackContext, b: &TrackContext| {
                calls.fetch_add(1, AtomicOrdering::SeqCst);
                seen.lock()
                    .unwrap()
                    .push((a.track_id().to_string(), b.track_id().to_string()));
                engine.score(a, b)
            };

            let rows = score_upper_triangle(&all[..n], &counting);

            assert_eq!(calls.load(AtomicOrdering::SeqCst), n * n.saturating_sub(1) / 2);
            assert_eq!(rows.len(), n);
            for (i, row) in rows.iter().enumerate() {
                assert_eq!(row.len(), n - 1 - i);
            }
            let mut pairs = seen.into_inner().unwrap();
            let before = pairs.len();
            pairs.sort();
            pairs.dedup();
            assert_eq!(pairs.len(), before);
            // Only (i, j) with i < j is ever evaluated
            assert!(pairs.iter().all(|(a, b)| a < b));
        }
    }

    #[test]
    fn test_dedicated_pool_matches_global_pool() {
        let all = tracks();
        let global = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&all);
        let dedicated =
            BatchCompatibilityMatrix::with_worker_threads(CompatibilityEngine::default(), 2)
                .unwrap()
                .build(&all);
        assert_eq!(global, dedicated);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(
            BatchCompatibilityMatrix::with_worker_threads(CompatibilityEngine::default(), 0)
                .is_err()
        );
    }

    #[test]
    fn test_out_of_bounds_lookup() {
        let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&tracks());
        assert_eq!(matrix.get(5, 0), None);
        assert_eq!(matrix.score(0, 99), None);
        assert!(matrix.best_matches(42, 3).is_empty());
    }

    #[test]
    fn test_best_matches_ranking() {
        let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&tracks());
        let best = matrix.best_matches(0, 2);
        assert_eq!(best.len(), 2);
        // t1 is close in tempo, key and energy
        assert_eq!(best[0].0, 1);
        assert!(best[0].1 >= best[1].1);
        assert!(best.iter().all(|(j, _)| *j != 0));

        let everything = matrix.best_matches(0, 100);
        assert_eq!(everything.len(), 4);
    }

    #[test]
    fn test_view_and_index_lookup() {
        let matrix = BatchCompatibilityMatrix::new(CompatibilityEngine::default()).build(&tracks());
        let view = matrix.to_view();
        assert_eq!(view.track_ids, vec!["t0", "t1", "t2", "t3", "t4"]);
        assert_eq!(view.scores.len(), 5);
        assert!(view.scores.iter().all(|row| row.len() == 5));
        assert_eq!(view.scores[1][3], matrix.score(1, 3).unwrap());
        assert_eq!(matrix.index_of("t3"), Some(3));
        assert_eq!(matrix.index_of("missing"), None);
    }
}
