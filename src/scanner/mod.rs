//! Library scanning: turn a directory tree into folder records.
//!
//! Walks the tree with walkdir, groups audio files by their containing
//! directory, and builds one [`FolderRecord`] per directory that holds
//! enough audio files. Tag reading uses lofty; a file whose tags cannot be
//! read still gets a record with its optional fields left empty - one bad
//! rip never sinks its folder.

mod art;
mod hash;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{Error, Result, ResultExt};
use crate::model::{FileRecord, FolderRecord};
use crate::similarity::text::{average_pairwise_similarity, strip_numbering};

pub use hash::compute_file_hash;

pub struct FolderRecordBuilder {
    config: ScanConfig,
}

impl FolderRecordBuilder {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan a tree and build records for every qualifying folder.
    ///
    /// Folders with fewer than `min_files` audio files are skipped. Folder
    /// work runs on the rayon pool; output is sorted by path so repeated
    /// scans of the same tree produce identical output.
    pub fn scan_tree(&self, root: &Path) -> Result<Vec<FolderRecord>> {
        tracing::info!(target: "scanner", "Scanning {}", root.display());

        // Fail fast on a bad root instead of silently yielding nothing
        std::fs::metadata(root).with_context(format!("reading {}", root.display()))?;

        let mut by_folder: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.is_audio(path) {
                continue;
            }
            if let Some(parent) = path.parent() {
                by_folder
                    .entry(parent.to_path_buf())
                    .or_default()
                    .push(path.to_path_buf());
            }
        }

        let qualifying: Vec<(PathBuf, Vec<PathBuf>)> = by_folder
            .into_iter()
            .filter(|(dir, files)| {
                if files.len() < self.config.min_files {
                    tracing::debug!(
                        target: "scanner",
                        "Skipping {} ({} audio files, need {})",
                        dir.display(),
                        files.len(),
                        self.config.min_files
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        let mut folders: Vec<FolderRecord> = qualifying
            .into_par_iter()
            .map(|(dir, files)| self.build_folder(&dir, files))
            .collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!(target: "scanner", "Built {} folder records", folders.len());
        Ok(folders)
    }

    /// Build one record from a folder and its audio file paths.
    pub fn build_folder(&self, dir: &Path, mut files: Vec<PathBuf>) -> FolderRecord {
        // Stable positional order: digit-stripped lowercase name, so
        // "01 - x" and "1. x" folders line up track-for-track.
        files.sort_by_key(|p| {
            let name = file_name(p).to_lowercase();
            (strip_numbering(&name), name)
        });

        let records: Vec<FileRecord> = files.iter().map(|p| self.read_file(p)).collect();

        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        let titles: Vec<&str> = records.iter().filter_map(|r| r.title.as_deref()).collect();

        FolderRecord {
            path: dir.to_string_lossy().into_owned(),
            file_name_similarity: average_pairwise_similarity(&names),
            title_similarity: average_pairwise_similarity(&titles),
            album_art_hash: art::folder_art_hash(dir, &files),
            files: records,
        }
    }

    fn read_file(&self, path: &Path) -> FileRecord {
        let mut record = FileRecord {
            filename: file_name(path).to_string(),
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_lowercase(),
            ..Default::default()
        };

        match compute_file_hash(path) {
            Ok(hash) => record.content_hash = Some(hash),
            Err(e) => {
                tracing::warn!(target: "scanner", "Failed to hash {}: {}", path.display(), e);
            }
        }

        if let Err(e) = read_tags(path, &mut record) {
            tracing::debug!(target: "scanner", "{e}");
        }

        record
    }

    fn is_audio(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.config.audio_extensions.contains(&ext)
            })
            .unwrap_or(false)
    }
}

/// Read tag fields into an existing record. Failure leaves the optional
/// fields empty; the caller decides how loudly to report it.
fn read_tags(path: &Path, record: &mut FileRecord) -> Result<()> {
    let tagged = Probe::open(path)
        .and_then(|p| p.read())
        .map_err(|e| Error::metadata(path, e.to_string()))?;

    record.bitrate = tagged.properties().audio_bitrate();
    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        record.title = tag.title().map(|s| s.to_string());
        record.artist = tag.artist().map(|s| s.to_string());
        record.album = tag.album().map(|s| s.to_string());
        for item in tag.items() {
            let key = item.key();
            if matches!(
                key,
                ItemKey::TrackTitle | ItemKey::TrackArtist | ItemKey::AlbumTitle
            ) {
                continue;
            }
            if let ItemValue::Text(value) = item.value() {
                record
                    .extra
                    .insert(format!("{key:?}").to_lowercase(), value.clone());
            }
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn builder() -> FolderRecordBuilder {
        FolderRecordBuilder::new(ScanConfig::default())
    }

    fn touch(dir: &Path, name: &str, content: &[u8]) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_scan_groups_by_folder() {
        let root = tempdir().unwrap();
        let album_a = root.path().join("Album A");
        let album_b = root.path().join("Album B");
        std::fs::create_dir_all(&album_a).unwrap();
        std::fs::create_dir_all(&album_b).unwrap();
        for i in 1..=3 {
            touch(&album_a, &format!("{i:02} - track.mp3"), b"aaa");
            touch(&album_b, &format!("{i:02} - track.mp3"), b"bbb");
        }
        touch(&album_a, "notes.txt", b"not audio");

        let folders = builder().scan_tree(root.path()).unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].file_count(), 3);
        assert_eq!(folders[1].file_count(), 3);
    }

    #[test]
    fn test_missing_root_errors() {
        assert!(builder().scan_tree(Path::new("/nonexistent/library")).is_err());
    }

    #[test]
    fn test_small_folders_skipped() {
        let root = tempdir().unwrap();
        let single = root.path().join("Single");
        std::fs::create_dir_all(&single).unwrap();
        touch(&single, "track.mp3", b"x");
        touch(&single, "other.mp3", b"y");

        let folders = builder().scan_tree(root.path()).unwrap();
        assert!(folders.is_empty());
    }

    #[test]
    fn test_extension_filter_case_insensitive() {
        let root = tempdir().unwrap();
        let album = root.path().join("Album");
        std::fs::create_dir_all(&album).unwrap();
        touch(&album, "one.MP3", b"1");
        touch(&album, "two.Flac", b"2");
        touch(&album, "three.ogg", b"3");
        touch(&album, "cover.jpg", b"not audio");

        let folders = builder().scan_tree(root.path()).unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].file_count(), 3);
    }

    #[test]
    fn test_files_sorted_by_stripped_name() {
        let root = tempdir().unwrap();
        let album = root.path().join("Album");
        std::fs::create_dir_all(&album).unwrap();
        // Creation order deliberately scrambled
        touch(&album, "03 Cedar.mp3", b"3");
        touch(&album, "01 Apple.mp3", b"1");
        touch(&album, "02 Birch.mp3", b"2");

        let folders = builder().scan_tree(root.path()).unwrap();
        let names: Vec<&str> = folders[0].files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["01 Apple.mp3", "02 Birch.mp3", "03 Cedar.mp3"]);
    }

    #[test]
    fn test_unreadable_tags_leave_fields_empty() {
        let root = tempdir().unwrap();
        let album = root.path().join("Album");
        std::fs::create_dir_all(&album).unwrap();
        for i in 1..=3 {
            touch(&album, &format!("{i:02}.mp3"), b"not a real mp3");
        }

        let folders = builder().scan_tree(root.path()).unwrap();
        let file = &folders[0].files[0];
        assert!(file.title.is_none());
        assert!(file.artist.is_none());
        // Content hash works regardless of tag state
        assert!(file.content_hash.is_some());
    }

    #[test]
    fn test_identical_bytes_identical_hashes() {
        let root = tempdir().unwrap();
        let a = root.path().join("A");
        let b = root.path().join("B");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        for i in 1..=3 {
            touch(&a, &format!("{i:02}.mp3"), b"same bytes");
            touch(&b, &format!("{i:02}.mp3"), b"same bytes");
        }

        let folders = builder().scan_tree(root.path()).unwrap();
        assert_eq!(folders.len(), 2);
        for (fa, fb) in folders[0].files.iter().zip(&folders[1].files) {
            assert_eq!(fa.content_hash, fb.content_hash);
        }
    }
}
