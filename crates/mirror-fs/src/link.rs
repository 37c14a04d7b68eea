//! Link, copy and removal primitives
//!
//! Every creation primitive replaces whatever already sits at the target
//! path. Removal is link-aware: a link is unlinked, never followed, so
//! removing a mirrored entry can not touch library content.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::{Error, Result};

/// How a directory link is realised on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryLinkKind {
    /// NTFS junction. Unix hosts have no junctions and create a symlink.
    Junction,
    /// Symbolic directory link.
    Symlink,
}

/// Whether anything exists at `path`, including a link whose target is gone.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether `path` is a link whose target no longer resolves.
pub fn is_dangling_link(path: &Path) -> bool {
    is_link(path) && fs::metadata(path).is_err()
}

/// Whether `path` is a link (symlink or junction).
pub fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Remove whatever exists at `path`, recursively for real directories.
///
/// Returns `Ok(false)` when nothing was there.
pub fn remove_entry(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(path, e)),
    };

    let file_type = meta.file_type();
    let result = if file_type.is_symlink() {
        remove_link(path, &meta)
    } else if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Removed entry");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

#[cfg(windows)]
fn remove_link(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x10;

    // Directory symlinks and junctions are directories to the Win32 API
    if meta.file_attributes() & FILE_ATTRIBUTE_DIRECTORY != 0 {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
fn remove_link(path: &Path, _meta: &fs::Metadata) -> io::Result<()> {
    fs::remove_file(path)
}

/// Create a directory link at `target` pointing to `source`.
pub fn link_directory(source: &Path, target: &Path, kind: DirectoryLinkKind) -> Result<()> {
    remove_entry(target)?;
    create_directory_link(source, target, kind).map_err(|e| Error::io(target, e))
}

#[cfg(unix)]
fn create_directory_link(
    source: &Path,
    target: &Path,
    _kind: DirectoryLinkKind,
) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_directory_link(source: &Path, target: &Path, kind: DirectoryLinkKind) -> io::Result<()> {
    match kind {
        DirectoryLinkKind::Symlink => std::os::windows::fs::symlink_dir(source, target),
        DirectoryLinkKind::Junction => create_junction(source, target),
    }
}

/// Create and drop an empty directory at `target`.
///
/// `mklink` reports failures only as localized text, so the OS error of this
/// check is what carries the real cause (access denied, missing parent).
#[cfg(any(windows, test))]
fn check_directory_slot(target: &Path) -> io::Result<()> {
    fs::create_dir(target)?;
    fs::remove_dir(target)
}

#[cfg(windows)]
fn create_junction(source: &Path, target: &Path) -> io::Result<()> {
    check_directory_slot(target)?;
    let output = std::process::Command::new("cmd")
        .arg("/C")
        .arg("mklink")
        .arg("/J")
        .arg(target)
        .arg(source)
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Create a file link at `target` pointing to `source`.
pub fn link_file(source: &Path, target: &Path) -> Result<()> {
    remove_entry(target)?;
    create_file_link(source, target).map_err(|e| Error::io(target, e))
}

#[cfg(unix)]
fn create_file_link(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn create_file_link(source: &Path, target: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, target)
}

/// Byte-copy `source` to `target`, creating the parent directory first.
///
/// An existing entry at `target` is removed before copying so that a stale
/// link is replaced instead of written through.
pub fn copy_file(source: &Path, target: &Path) -> Result<u64> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    remove_entry(target)?;
    fs::copy(source, target).map_err(|e| Error::io(target, e))
}

/// Create `path` and its ancestors if absent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}
