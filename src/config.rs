//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\dupe-minder\config.toml
//! - macOS: ~/Library/Application Support/dupe-minder/config.toml
//! - Linux: ~/.config/dupe-minder/config.toml
//!
//! All weights and thresholds used by the similarity engine and the
//! quality scorer live here. The loaded value is passed into component
//! constructors as an immutable snapshot; nothing reads it globally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Similarity engine weights and thresholds
    pub similarity: SimilarityConfig,

    /// Quality scorer weights and preferences
    pub quality: QualityConfig,

    /// Library scanning settings
    pub scan: ScanConfig,
}

/// Weights and thresholds for folder-to-folder comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Raw string ratios below this clamp to 0 in folder-level comparisons
    pub clamp_threshold: f64,

    /// Intra-folder name uniformity above this triggers the genericity discount
    pub generic_threshold: f64,

    /// Discount strength: contribution × (1 - uniformity × reduction_factor)
    pub reduction_factor: f64,

    /// Minimum weighted score (0-100) for a pair to be reported
    pub min_score: f64,

    /// Parameter weights for the weighted score
    pub weights: SimilarityWeights,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            clamp_threshold: 0.75,
            generic_threshold: 0.7,
            reduction_factor: 0.5,
            min_score: 60.0,
            weights: SimilarityWeights::default(),
        }
    }
}

/// Per-parameter weights for the similarity engine.
///
/// The score is normalized by the weights of parameters actually present
/// in a given pair, so absent parameters (e.g. no album art on either
/// side) do not drag the score down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub file_hash: f64,
    pub filename: f64,
    pub title: f64,
    pub album: f64,
    pub artist: f64,
    pub folder_name: f64,
    pub album_art: f64,
    pub bitrate: f64,
    /// Weight applied to each shared extra-metadata key
    pub extra_key: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            file_hash: 5.0,
            filename: 3.0,
            title: 2.5,
            album: 2.5,
            artist: 1.5,
            folder_name: 1.5,
            album_art: 1.0,
            bitrate: 0.5,
            extra_key: 0.5,
        }
    }
}

/// Weights and preferences for absolute folder quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Preferred bitrate policy: "high" or a target kbps value like "128"
    pub preferred_bitrate: String,

    /// Extensions counted as lossless (lowercase, no dot)
    pub lossless_extensions: Vec<String>,

    /// Component weights for the total quality score
    pub weights: QualityWeights,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            preferred_bitrate: "high".to_string(),
            lossless_extensions: vec!["flac".to_string(), "wav".to_string()],
            weights: QualityWeights::default(),
        }
    }
}

/// Per-component weights for the quality scorer. Unlike similarity, the
/// denominator is fixed: every component always applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub hebrew_metadata: f64,
    pub metadata_completeness: f64,
    pub bitrate: f64,
    pub lossless_format: f64,
    pub consistent_artist: f64,
    pub consistent_album: f64,
    pub album_art: f64,
    pub repetitive_names: f64,
    pub lyrics: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            hebrew_metadata: 2.0,
            metadata_completeness: 2.0,
            bitrate: 2.0,
            lossless_format: 2.0,
            consistent_artist: 1.5,
            consistent_album: 1.5,
            album_art: 1.0,
            repetitive_names: 1.0,
            lyrics: 1.0,
        }
    }
}

impl QualityWeights {
    /// Weight table keyed by component name, in reporting order.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("hebrew_metadata", self.hebrew_metadata),
            ("metadata_completeness", self.metadata_completeness),
            ("bitrate", self.bitrate),
            ("lossless_format", self.lossless_format),
            ("consistent_artist", self.consistent_artist),
            ("consistent_album", self.consistent_album),
            ("album_art", self.album_art),
            ("repetitive_names", self.repetitive_names),
            ("lyrics", self.lyrics),
        ])
    }
}

/// Library scanning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Folders with fewer audio files than this are skipped
    pub min_files: usize,

    /// Audio extensions considered during scanning (lowercase, no dot)
    pub audio_extensions: Vec<String>,

    /// Scan snapshot location (defaults next to the config file)
    pub data_file: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_files: 3,
            audio_extensions: ["mp3", "flac", "ogg", "wav", "m4a", "aac"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data_file: None,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dupe-minder"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to disk
///
/// Creates the config directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join("config.toml");

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[similarity]"));
        assert!(toml.contains("[quality]"));
        assert!(toml.contains("[scan]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.similarity.min_score = 75.0;
        config.quality.preferred_bitrate = "192".to_string();
        config.scan.min_files = 1;

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.similarity.min_score, 75.0);
        assert_eq!(parsed.quality.preferred_bitrate, "192");
        assert_eq!(parsed.scan.min_files, 1);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        // Config with only some fields
        let toml = r#"
[similarity]
min_score = 80.0
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.similarity.min_score, 80.0);

        // Other fields use defaults
        assert_eq!(config.similarity.clamp_threshold, 0.75);
        assert_eq!(config.quality.preferred_bitrate, "high");
        assert_eq!(config.scan.min_files, 3);
    }

    #[test]
    fn test_quality_weight_map_covers_all_components() {
        let weights = QualityWeights::default();
        let map = weights.as_map();
        assert_eq!(map.len(), 9);
        assert_eq!(map["hebrew_metadata"], 2.0);
        assert_eq!(map["lyrics"], 1.0);
    }
}
