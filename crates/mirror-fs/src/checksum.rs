//! SHA-256 checksum utilities
//!
//! Checksums use the canonical `sha256:<hex>` format. They back the drift
//! check for copied entries, where a target is compared against its source.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of a file's contents.
///
/// The file is streamed, so large media files are not loaded into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Whether two files have identical contents.
///
/// Sizes are compared first so differing files are usually rejected without
/// hashing.
pub fn files_match(a: &Path, b: &Path) -> std::io::Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(compute_file_checksum(a)? == compute_file_checksum(b)?)
}
