//! Persistent scan snapshot.
//!
//! One JSON document maps a digest of each folder path to its record and
//! scan timestamp. Keying by digest keeps the document flat and makes the
//! "already scanned?" check a plain map lookup. Saves are atomic (temp
//! file + rename) so a crash mid-write never corrupts the snapshot.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};
use crate::model::FolderRecord;

/// One scanned folder plus when it was scanned (RFC 3339).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub scanned_at: String,
    pub record: FolderRecord,
}

pub struct Store {
    path: PathBuf,
    entries: BTreeMap<String, StoreEntry>,
}

impl Store {
    /// Open a snapshot file, or start empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(format!("reading store {}", path.display()))?;
            let entries: BTreeMap<String, StoreEntry> = serde_json::from_str(&contents)
                .with_context(format!("parsing store {}", path.display()))?;
            tracing::info!(
                target: "store",
                "Loaded {} folder records from {}",
                entries.len(),
                path.display()
            );
            entries
        } else {
            tracing::debug!(target: "store", "No store at {}, starting empty", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Has this folder already been scanned?
    pub fn contains(&self, folder_path: &str) -> bool {
        self.entries.contains_key(&path_digest(folder_path))
    }

    /// Insert or replace a folder record, stamping it with the current time.
    pub fn insert(&mut self, record: FolderRecord) {
        let digest = path_digest(&record.path);
        self.entries.insert(
            digest,
            StoreEntry {
                scanned_at: Utc::now().to_rfc3339(),
                record,
            },
        );
    }

    /// All stored records, in stable digest order.
    pub fn records(&self) -> impl Iterator<Item = &FolderRecord> {
        self.entries.values().map(|e| &e.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the snapshot atomically.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(format!("creating store directory {}", dir.display()))?;
        }

        let contents = serde_json::to_string_pretty(&self.entries)
            .with_context("serializing store")?;

        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, &contents)
            .with_context(format!("writing store temp file {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(format!("replacing store {}", self.path.display()))?;

        tracing::info!(
            target: "store",
            "Saved {} folder records to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn path_digest(folder_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(folder_path.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_album;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_starts_empty() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("scan.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_and_contains() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path().join("scan.json")).unwrap();
        assert!(!store.contains("/music/Album"));

        store.insert(mock_album("/music/Album", "Artist", "Album"));
        assert!(store.contains("/music/Album"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.json");

        let mut store = Store::open(&path).unwrap();
        store.insert(mock_album("/music/a/Album", "Artist", "Album"));
        store.insert(mock_album("/music/b/Other", "Other", "Other"));
        store.save().unwrap();

        let reloaded = Store::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("/music/a/Album"));
        assert!(reloaded.contains("/music/b/Other"));

        let record = reloaded
            .records()
            .find(|r| r.path == "/music/a/Album")
            .unwrap();
        assert_eq!(record.file_count(), 3);
    }

    #[test]
    fn test_reinsert_replaces() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path().join("scan.json")).unwrap();

        store.insert(mock_album("/music/Album", "Artist", "Album"));
        let mut updated = mock_album("/music/Album", "Artist", "Album");
        updated.files.pop();
        store.insert(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.records().next().unwrap().file_count(), 2);
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.json");
        let mut store = Store::open(&path).unwrap();
        store.insert(mock_album("/music/Album", "Artist", "Album"));
        store.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let entries: BTreeMap<String, StoreEntry> = serde_json::from_str(&raw).unwrap();
        let entry = entries.values().next().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.scanned_at).is_ok());
    }
}
