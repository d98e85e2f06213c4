//! Shared test helpers for building mock records.
//!
//! Only compiled for tests. Factories default every optional field and let
//! each test override exactly what it cares about.

use crate::model::{FileRecord, FolderRecord};
use crate::similarity::text::average_pairwise_similarity;
use std::collections::BTreeMap;

/// A file record with tags derived from the track name.
pub fn mock_file(filename: &str, artist: &str, album: &str, title: &str) -> FileRecord {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or("mp3")
        .to_lowercase();
    FileRecord {
        filename: filename.to_string(),
        artist: Some(artist.to_string()),
        album: Some(album.to_string()),
        title: Some(title.to_string()),
        bitrate: Some(320),
        extension,
        content_hash: None,
        extra: BTreeMap::new(),
    }
}

/// A folder record over the given files, with genericity aggregates computed
/// the same way the scanner computes them.
pub fn mock_folder(path: &str, files: Vec<FileRecord>) -> FolderRecord {
    let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
    let titles: Vec<&str> = files
        .iter()
        .filter_map(|f| f.title.as_deref())
        .collect();
    FolderRecord {
        path: path.to_string(),
        file_name_similarity: average_pairwise_similarity(&names),
        title_similarity: average_pairwise_similarity(&titles),
        album_art_hash: None,
        files,
    }
}

/// A typical well-tagged three-track album folder.
pub fn mock_album(path: &str, artist: &str, album: &str) -> FolderRecord {
    let files = vec![
        mock_file(
            &format!("01 - {album} Opener.mp3"),
            artist,
            album,
            &format!("{album} Opener"),
        ),
        mock_file("02 - Midpoint.mp3", artist, album, "Midpoint"),
        mock_file("03 - Closer.mp3", artist, album, "Closer"),
    ];
    mock_folder(path, files)
}

/// Assign sequential content hashes so two folders built from the same seed
/// compare as byte-identical.
pub fn with_hashes(mut folder: FolderRecord, seed: &str) -> FolderRecord {
    for (i, file) in folder.files.iter_mut().enumerate() {
        file.content_hash = Some(format!("{seed}-{i:04}"));
    }
    folder
}
