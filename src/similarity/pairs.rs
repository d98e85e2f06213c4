//! Candidate pair enumeration over a scanned library.
//!
//! Every unordered folder pair is compared exactly once. The loop is O(n²)
//! in folder count, so comparisons run on the rayon pool; each pair is owned
//! by exactly one task and results are collected, then sorted once at the
//! end. No shared mutable state.

use rayon::prelude::*;

use crate::config::SimilarityConfig;
use crate::model::{FolderRecord, PairKey, SimilarityResult};
use crate::similarity::engine::FolderSimilarityEngine;

pub struct PairFinder {
    engine: FolderSimilarityEngine,
}

impl PairFinder {
    pub fn new(config: SimilarityConfig) -> Self {
        Self {
            engine: FolderSimilarityEngine::new(config),
        }
    }

    /// Find all folder pairs scoring at least `min_score`.
    ///
    /// Pairs with unequal file counts are skipped before comparison (the
    /// engine would refuse them anyway; the pre-check avoids building the
    /// comparison state). Results are sorted by descending score, with the
    /// canonical pair key as tiebreaker so output order is deterministic.
    pub fn find_pairs(
        &self,
        folders: &[FolderRecord],
        min_score: f64,
    ) -> Vec<(PairKey, SimilarityResult)> {
        tracing::info!(
            target: "similarity",
            "Comparing {} folders ({} pairs)",
            folders.len(),
            folders.len() * folders.len().saturating_sub(1) / 2
        );

        let mut results: Vec<(PairKey, SimilarityResult)> = (0..folders.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let a = &folders[i];
                folders[i + 1..].iter().filter_map(move |b| {
                    if a.file_count() != b.file_count() {
                        return None;
                    }
                    let result = self.engine.compare(a, b)?;
                    if result.weighted_score >= min_score {
                        Some((PairKey::new(a.path.clone(), b.path.clone()), result))
                    } else {
                        None
                    }
                })
            })
            .collect();

        results.sort_by(|(ka, ra), (kb, rb)| {
            rb.weighted_score
                .total_cmp(&ra.weighted_score)
                .then_with(|| ka.cmp(kb))
        });

        tracing::info!(
            target: "similarity",
            "{} pairs at or above score {:.1}",
            results.len(),
            min_score
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_album, with_hashes};

    fn finder() -> PairFinder {
        PairFinder::new(SimilarityConfig::default())
    }

    #[test]
    fn test_empty_library() {
        assert!(finder().find_pairs(&[], 60.0).is_empty());
    }

    #[test]
    fn test_single_folder_no_pairs() {
        let folders = vec![mock_album("/music/a/Album", "Artist", "Album")];
        assert!(finder().find_pairs(&folders, 60.0).is_empty());
    }

    #[test]
    fn test_duplicates_found_once() {
        let folders = vec![
            mock_album("/music/a/Album", "Artist", "Album"),
            mock_album("/music/b/Album", "Artist", "Album"),
            mock_album("/music/c/Unrelated", "Someone Else", "Unrelated"),
        ];
        let pairs = finder().find_pairs(&folders, 60.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs[0].0,
            PairKey::new("/music/a/Album", "/music/b/Album")
        );
    }

    #[test]
    fn test_sorted_descending_by_score() {
        let folders = vec![
            with_hashes(mock_album("/music/a/Exact", "Artist", "Exact"), "x"),
            with_hashes(mock_album("/music/b/Exact", "Artist", "Exact"), "x"),
            mock_album("/music/c/Close", "Artist", "Close"),
            mock_album("/music/d/Cloze", "Artist", "Cloze"),
        ];
        let pairs = finder().find_pairs(&folders, 60.0);
        assert!(pairs.len() >= 2);
        for window in pairs.windows(2) {
            assert!(window[0].1.weighted_score >= window[1].1.weighted_score);
        }
        // The identical pair leads
        assert!(pairs[0].1.identical);
    }

    #[test]
    fn test_min_score_filter() {
        let folders = vec![
            mock_album("/music/a/Album", "Artist", "Album"),
            mock_album("/music/b/Album", "Artist", "Album"),
        ];
        assert_eq!(finder().find_pairs(&folders, 60.0).len(), 1);
        assert!(finder().find_pairs(&folders, 100.1).is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let folders = vec![
            mock_album("/music/a/Album", "Artist", "Album"),
            mock_album("/music/b/Album", "Artist", "Album"),
            mock_album("/music/c/Album", "Artist", "Album"),
        ];
        let first = finder().find_pairs(&folders, 60.0);
        let second = finder().find_pairs(&folders, 60.0);
        let keys: Vec<_> = first.iter().map(|(k, _)| k.clone()).collect();
        let keys2: Vec<_> = second.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, keys2);
    }
}
