//! Absolute folder quality scoring.
//!
//! Each folder gets a standalone 0-100 score decomposed into named
//! components, so two copies of the same album can be ranked and the
//! ranking explained. Scoring is pure over one [`FolderRecord`]; nothing
//! here touches the filesystem.

pub mod garbled;

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::QualityConfig;
use crate::model::{FileRecord, FolderRecord, QualityBreakdown};
use garbled::{GarbledTextDetector, MojibakeDetector};

// Hebrew letters and points
const HEBREW_START: char = '\u{0590}';
const HEBREW_END: char = '\u{05EA}';

/// What counts as a good bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitratePolicy {
    /// Higher is better, 320 kbps and above is perfect
    High,
    /// Closest to a specific target wins (e.g. a 128 kbps portable library)
    Target(u32),
}

impl FromStr for BitratePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("high") {
            Ok(Self::High)
        } else {
            s.parse::<u32>()
                .map(Self::Target)
                .map_err(|_| format!("invalid bitrate policy: {s:?} (expected \"high\" or kbps)"))
        }
    }
}

/// Score an average bitrate in kbps against a policy, in [0,1].
///
/// `High` saturates at 320 kbps; `Target` decays linearly with distance
/// from the target, reaching zero 192 kbps away.
pub fn compute_bitrate_score(avg_kbps: f64, policy: BitratePolicy) -> f64 {
    match policy {
        BitratePolicy::High => (avg_kbps / 320.0).min(1.0),
        BitratePolicy::Target(target) => {
            (1.0 - (avg_kbps - target as f64).abs() / 192.0).max(0.0)
        }
    }
}

pub struct FolderQualityScorer {
    config: QualityConfig,
    policy: Option<BitratePolicy>,
    detector: Box<dyn GarbledTextDetector>,
}

impl FolderQualityScorer {
    /// Build a scorer from config, using the default mojibake detector.
    ///
    /// An unparseable `preferred_bitrate` is warned about and zeroes the
    /// bitrate component rather than failing the whole run.
    pub fn new(config: QualityConfig) -> Self {
        let policy = match config.preferred_bitrate.parse() {
            Ok(policy) => Some(policy),
            Err(e) => {
                tracing::warn!(target: "quality", "{e}; bitrate component will score 0");
                None
            }
        };
        Self {
            config,
            policy,
            detector: Box::new(MojibakeDetector),
        }
    }

    pub fn with_detector(mut self, detector: Box<dyn GarbledTextDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Score one folder. Components are computed in [0,1] and reported
    /// ×100; the total is their weighted average over the fixed weight
    /// table, so every component always participates.
    pub fn score(&self, folder: &FolderRecord) -> QualityBreakdown {
        let count = folder.file_count();
        if count == 0 {
            let components = self
                .config
                .weights
                .as_map()
                .keys()
                .map(|k| (k.to_string(), 0.0))
                .collect();
            return QualityBreakdown {
                total_score: 0.0,
                components,
            };
        }

        let n = count as f64;
        let files = &folder.files;

        let hebrew = files.iter().filter(|f| has_hebrew(f)).count() as f64 / n;
        let complete = files.iter().filter(|f| self.is_complete(f)).count() as f64 / n;
        let art = if folder.album_art_hash.is_some() { 1.0 } else { 0.0 };
        let bitrate = self.bitrate_component(files);
        let repetitive =
            1.0 - folder.file_name_similarity.max(folder.title_similarity);
        let artist = consistency(files.iter().map(|f| f.artist.as_deref()));
        let album = consistency(files.iter().map(|f| f.album.as_deref()));
        let lossless = files
            .iter()
            .filter(|f| self.config.lossless_extensions.contains(&f.extension))
            .count() as f64
            / n;
        let lyrics = files
            .iter()
            .filter(|f| f.extra.contains_key("lyrics"))
            .count() as f64
            / n;

        let raw: BTreeMap<&'static str, f64> = BTreeMap::from([
            ("hebrew_metadata", hebrew),
            ("metadata_completeness", complete),
            ("bitrate", bitrate),
            ("lossless_format", lossless),
            ("consistent_artist", artist),
            ("consistent_album", album),
            ("album_art", art),
            ("repetitive_names", repetitive),
            ("lyrics", lyrics),
        ]);

        let weights = self.config.weights.as_map();
        let weight_total: f64 = weights.values().sum();
        let weighted_sum: f64 = raw.iter().map(|(name, score)| score * weights[name]).sum();

        QualityBreakdown {
            total_score: 100.0 * weighted_sum / weight_total,
            components: raw
                .into_iter()
                .map(|(name, score)| (name.to_string(), score * 100.0))
                .collect(),
        }
    }

    fn is_complete(&self, file: &FileRecord) -> bool {
        let fields = [&file.title, &file.artist, &file.album];
        fields.iter().all(|f| match f {
            Some(value) => !value.is_empty() && !self.detector.is_garbled(value),
            None => false,
        })
    }

    fn bitrate_component(&self, files: &[FileRecord]) -> f64 {
        let Some(policy) = self.policy else {
            return 0.0;
        };
        let rates: Vec<u32> = files.iter().filter_map(|f| f.bitrate).collect();
        if rates.is_empty() {
            return 0.0;
        }
        let avg = rates.iter().sum::<u32>() as f64 / rates.len() as f64;
        compute_bitrate_score(avg, policy)
    }
}

fn has_hebrew(file: &FileRecord) -> bool {
    [&file.title, &file.artist, &file.album]
        .iter()
        .filter_map(|f| f.as_deref())
        .any(|s| s.chars().any(|c| (HEBREW_START..=HEBREW_END).contains(&c)))
}

/// 1.0 when every file agrees on a single non-null value.
///
/// A folder where the field is entirely missing has no signal, which is
/// not the same as agreement: it scores 0.
fn consistency<'a>(values: impl Iterator<Item = Option<&'a str>>) -> f64 {
    let distinct: std::collections::BTreeSet<&str> = values.flatten().collect();
    if distinct.len() == 1 { 1.0 } else { 0.0 }
}
