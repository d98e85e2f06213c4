//! Album art discovery and normalized hashing.
//!
//! Two folders holding the same cover saved by different tools (JPEG vs
//! PNG, different resolutions) should still match, so cover images are
//! decoded and resized to a fixed 100x100 before hashing. When no cover
//! file exists, the first embedded picture's raw bytes are hashed instead.

use image::imageops::FilterType;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const ART_SIZE: u32 = 100;

// Checked in order; first hit wins
const COVER_NAMES: &[&str] = &[
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "folder.jpg",
    "folder.jpeg",
    "folder.png",
    "front.jpg",
    "front.png",
    "albumart.jpg",
];

/// Hash for a folder's album art, or `None` when the folder has none.
pub fn folder_art_hash(dir: &Path, audio_files: &[PathBuf]) -> Option<String> {
    if let Some(cover) = find_cover_file(dir) {
        match normalized_image_hash(&cover) {
            Ok(hash) => return Some(hash),
            Err(e) => {
                tracing::warn!(
                    target: "scanner",
                    "Failed to decode cover {}: {}",
                    cover.display(),
                    e
                );
            }
        }
    }

    audio_files.iter().find_map(|p| embedded_art_hash(p))
}

fn find_cover_file(dir: &Path) -> Option<PathBuf> {
    let entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    for wanted in COVER_NAMES {
        if let Some(found) = entries.iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.eq_ignore_ascii_case(wanted))
        }) {
            return Some(found.clone());
        }
    }
    None
}

/// Decode, resize to a fixed square, and hash the raw pixels.
fn normalized_image_hash(path: &Path) -> image::ImageResult<String> {
    let img = image::open(path)?;
    let normalized = img.resize_exact(ART_SIZE, ART_SIZE, FilterType::Triangle);
    let mut hasher = Sha256::new();
    hasher.update(normalized.to_rgba8().into_raw());
    Ok(format!("{:x}", hasher.finalize()))
}

fn embedded_art_hash(path: &Path) -> Option<String> {
    let tagged = Probe::open(path).ok()?.read().ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let picture = tag.pictures().first()?;
    let mut hasher = Sha256::new();
    hasher.update(picture.data());
    Some(format!("{:x}", hasher.finalize()))
}
