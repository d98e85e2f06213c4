//! Weighted multi-factor comparison of two folder records.
//!
//! The engine is stateless apart from the configured weight table; every
//! call is a pure function of the two records. Comparison only makes sense
//! for folders with the same number of files, where positional file pairing
//! approximates track correspondence (records are sorted on a digit-stripped
//! filename key at build time).

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SimilarityConfig;
use crate::model::{FolderRecord, SimilarityResult};
use crate::similarity::text::{clamped_similarity, genericity_discount};

/// Parameter names used in the score breakdown.
pub const PARAM_FILE_HASH: &str = "file_hash";
pub const PARAM_FILENAME: &str = "filename";
pub const PARAM_TITLE: &str = "title";
pub const PARAM_ALBUM: &str = "album";
pub const PARAM_ARTIST: &str = "artist";
pub const PARAM_FOLDER_NAME: &str = "folder_name";
pub const PARAM_ALBUM_ART: &str = "album_art";
pub const PARAM_BITRATE: &str = "bitrate";

pub struct FolderSimilarityEngine {
    config: SimilarityConfig,
}

impl FolderSimilarityEngine {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    /// Compare two folders and produce a weighted similarity result.
    ///
    /// Returns `None` when the folders have different file counts or either
    /// is empty; such pairs are simply not comparable positionally and the
    /// caller should skip them.
    ///
    /// When every positional file pair carries an equal non-null content
    /// hash the folders are byte-identical and the comparison short-circuits
    /// to a pinned score of 100 with no parameter breakdown.
    pub fn compare(&self, a: &FolderRecord, b: &FolderRecord) -> Option<SimilarityResult> {
        let count = a.file_count();
        if count == 0 || count != b.file_count() {
            tracing::debug!(
                target: "similarity",
                "Skipping incomparable pair: {} ({} files) vs {} ({} files)",
                a.path,
                count,
                b.path,
                b.file_count()
            );
            return None;
        }

        let weights = &self.config.weights;
        let mut scores: BTreeMap<String, f64> = BTreeMap::new();
        // Parallel (score * weight, weight) accumulators over present params
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        let mut add = |scores: &mut BTreeMap<String, f64>, name: String, score: f64, weight: f64| {
            weighted_sum += score * weight;
            weight_total += weight;
            scores.insert(name, score);
        };

        // Content hashes decide outright when they cover every position.
        let mut hash_matches = 0usize;
        for (fa, fb) in a.files.iter().zip(&b.files) {
            if let (Some(ha), Some(hb)) = (&fa.content_hash, &fb.content_hash) {
                if ha == hb {
                    hash_matches += 1;
                }
            }
        }
        if hash_matches == count {
            tracing::debug!(
                target: "similarity",
                "Identical content: {} == {}",
                a.path,
                b.path
            );
            return Some(SimilarityResult::identical());
        }
        // A hash parameter with zero matches says "not byte-identical",
        // which the metadata parameters already capture; it only joins the
        // weighted sum once it has something positive to say.
        if hash_matches > 0 {
            let score = hash_matches as f64 / count as f64;
            add(
                &mut scores,
                PARAM_FILE_HASH.to_string(),
                score,
                weights.file_hash,
            );
        }

        // Names that look alike inside their own folder ("Track 01", track
        // titles repeating the album name) say little about cross-folder
        // similarity, so their contribution is discounted.
        let name_discount = genericity_discount(
            a.file_name_similarity,
            b.file_name_similarity,
            self.config.generic_threshold,
            self.config.reduction_factor,
        );
        let title_discount = genericity_discount(
            a.title_similarity,
            b.title_similarity,
            self.config.generic_threshold,
            self.config.reduction_factor,
        );

        let threshold = self.config.clamp_threshold;
        let pairs = |f: fn(&crate::model::FileRecord) -> Option<&str>| {
            a.files
                .iter()
                .zip(&b.files)
                .map(move |(fa, fb)| (f(fa), f(fb)))
                .collect::<Vec<_>>()
        };

        if let Some(score) = per_file_score(&pairs(|f| Some(f.filename.as_str())), threshold) {
            add(
                &mut scores,
                PARAM_FILENAME.to_string(),
                score * name_discount,
                weights.filename,
            );
        }
        if let Some(score) = per_file_score(&pairs(|f| f.title.as_deref()), threshold) {
            add(
                &mut scores,
                PARAM_TITLE.to_string(),
                score * title_discount,
                weights.title,
            );
        }
        if let Some(score) = per_file_score(&pairs(|f| f.album.as_deref()), threshold) {
            add(&mut scores, PARAM_ALBUM.to_string(), score, weights.album);
        }
        if let Some(score) = per_file_score(&pairs(|f| f.artist.as_deref()), threshold) {
            add(&mut scores, PARAM_ARTIST.to_string(), score, weights.artist);
        }

        if let (Some(art_a), Some(art_b)) = (&a.album_art_hash, &b.album_art_hash) {
            let score = if art_a == art_b { 1.0 } else { 0.0 };
            add(
                &mut scores,
                PARAM_ALBUM_ART.to_string(),
                score,
                weights.album_art,
            );
        }

        add(
            &mut scores,
            PARAM_FOLDER_NAME.to_string(),
            clamped_similarity(a.basename(), b.basename(), threshold),
            weights.folder_name,
        );

        let mut bitrate_pairs = 0usize;
        let mut bitrate_matches = 0usize;
        for (fa, fb) in a.files.iter().zip(&b.files) {
            if let (Some(ra), Some(rb)) = (fa.bitrate, fb.bitrate) {
                bitrate_pairs += 1;
                if ra == rb {
                    bitrate_matches += 1;
                }
            }
        }
        if bitrate_pairs > 0 {
            add(
                &mut scores,
                PARAM_BITRATE.to_string(),
                bitrate_matches as f64 / count as f64,
                weights.bitrate,
            );
        }

        // Extra tag fields both folders know about (genre, year, ...)
        for key in shared_extra_keys(a, b) {
            let mut matches = 0usize;
            for (fa, fb) in a.files.iter().zip(&b.files) {
                if let (Some(va), Some(vb)) = (fa.extra.get(&key), fb.extra.get(&key)) {
                    if va.eq_ignore_ascii_case(vb) {
                        matches += 1;
                    }
                }
            }
            add(
                &mut scores,
                format!("extra:{key}"),
                matches as f64 / count as f64,
                weights.extra_key,
            );
        }

        let weighted_score = if weight_total > 0.0 {
            100.0 * weighted_sum / weight_total
        } else {
            0.0
        };

        Some(SimilarityResult {
            scores,
            identical: false,
            weighted_score,
        })
    }
}

/// Positional average of clamped similarities for one per-file parameter.
///
/// Pairs with a missing side contribute zero but stay in the denominator;
/// `None` means no pair had both sides and the parameter is absent entirely.
fn per_file_score(pairs: &[(Option<&str>, Option<&str>)], threshold: f64) -> Option<f64> {
    let mut total = 0.0;
    let mut present = false;
    for (va, vb) in pairs {
        if let (Some(va), Some(vb)) = (va, vb) {
            present = true;
            total += clamped_similarity(va, vb, threshold);
        }
    }
    present.then_some(total / pairs.len() as f64)
}

/// Extra-metadata keys present somewhere in both folders.
fn shared_extra_keys(a: &FolderRecord, b: &FolderRecord) -> Vec<String> {
    let keys_a: BTreeSet<&String> = a.files.iter().flat_map(|f| f.extra.keys()).collect();
    let keys_b: BTreeSet<&String> = b.files.iter().flat_map(|f| f.extra.keys()).collect();
    keys_a.intersection(&keys_b).map(|k| (*k).clone()).collect()
}
