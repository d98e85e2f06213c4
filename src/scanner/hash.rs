//! Content hashing for duplicate detection.
//!
//! Large audio files are hashed partially: the first and last 1 MiB plus
//! the file size. That is enough to tell two rips apart while keeping a
//! full-library scan fast.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

const CHUNK_SIZE: u64 = 1024 * 1024;

/// Compute a partial content hash (size + first 1 MiB + last 1 MiB).
///
/// Files at or under 2 MiB are hashed in full. Returns the SHA-256 digest
/// as a lowercase hex string.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read.
pub fn compute_file_hash(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let mut hasher = Sha256::new();

    // Size goes in first so truncated copies never collide with originals
    hasher.update(file_size.to_le_bytes());

    if file_size <= CHUNK_SIZE * 2 {
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        hasher.update(&buffer);
    } else {
        let mut buffer = vec![0u8; CHUNK_SIZE as usize];

        file.read_exact(&mut buffer)?;
        hasher.update(&buffer);

        file.seek(SeekFrom::End(-(CHUNK_SIZE as i64)))?;
        file.read_exact(&mut buffer)?;
        hasher.update(&buffer);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
