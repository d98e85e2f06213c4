//! Core data models for duplicate detection.
//!
//! Defines the primary entities: [`FileRecord`], [`FolderRecord`],
//! [`SimilarityResult`], [`QualityBreakdown`], and [`Decision`].
//! Records are built once per scan pass and treated as read-only input
//! for the duration of a scoring pass; similarity and quality values are
//! derived and can always be recomputed from the record set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracted facts about one audio file.
///
/// Optional fields are simply absent when the tag could not supply them;
/// missing data contributes a neutral zero to every score it feeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File name including extension
    pub filename: String,
    /// Artist tag, if any
    pub artist: Option<String>,
    /// Album tag, if any
    pub album: Option<String>,
    /// Title tag, if any
    pub title: Option<String>,
    /// Audio bitrate in kbps, if known
    pub bitrate: Option<u32>,
    /// Lowercase extension without the dot (e.g. "mp3")
    pub extension: String,
    /// Content digest (hex), if the file could be hashed
    pub content_hash: Option<String>,
    /// All other textual tag fields (genre, lyrics, year, ...)
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

/// One candidate album folder and its per-file records.
///
/// `files` is sorted by digit-stripped lowercase filename at build time so
/// positional pairing against another folder reflects track correspondence,
/// not OS listing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Absolute folder path (unique key)
    pub path: String,
    /// Per-file records in stable sorted order
    pub files: Vec<FileRecord>,
    /// Average pairwise similarity among digit-stripped filenames [0,1]
    pub file_name_similarity: f64,
    /// Average pairwise similarity among digit-stripped titles [0,1]
    pub title_similarity: f64,
    /// Normalized album art digest, if the folder has art
    pub album_art_hash: Option<String>,
}

impl FolderRecord {
    /// The final path component, used for folder-name similarity.
    pub fn basename(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or(&self.path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Canonical unordered pair of folder paths.
///
/// The two paths are stored lexicographically ordered, so each unordered
/// pair has exactly one key and result ordering is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Outcome of comparing two folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Per-parameter scores in [0,1], keyed by parameter name.
    /// Empty when `identical` short-circuited the comparison.
    pub scores: BTreeMap<String, f64>,
    /// True when every positional file pair shared an equal content hash
    pub identical: bool,
    /// Weighted composite score, 0-100
    pub weighted_score: f64,
}

impl SimilarityResult {
    /// An identical pair needs no breakdown: the score is pinned at 100.
    pub fn identical() -> Self {
        Self {
            scores: BTreeMap::new(),
            identical: true,
            weighted_score: 100.0,
        }
    }
}

/// Per-component decomposition of a folder's absolute quality score.
///
/// Components are reported on a 0-100 scale for transparency; `total_score`
/// is their weighted average using the fixed table in the quality config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityBreakdown {
    /// Weighted total, 0-100
    pub total_score: f64,
    /// Individual component scores, 0-100, keyed by component name
    pub components: BTreeMap<String, f64>,
}

/// Classification of a similar pair.
///
/// The resolver only classifies; deletion, merging, and user confirmation
/// belong to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// One folder has strictly higher quality
    Prefer { keep: String, discard: String },
    /// Quality tie (or missing score) - requires human input
    Ambiguous,
}
