//! Plan execution
//!
//! Applies a [`SyncPlan`] to the target directory: removals first, then
//! creations. Per-item failures are collected into the result and never
//! abort the run. There is no rollback; the returned index describes exactly
//! what is on disk afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mirror_fs::{DirectoryLinkKind, NormalizedPath};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::classify::{ErrorClass, classify_fs};
use crate::Error;
use crate::catalog::{IMAGES_DIR, INFO_SUFFIX};
use crate::index::SyncIndex;
use crate::item::{Item, LinkType, SyncMode};
use crate::plan::{PlannedEntry, SkipReason, SkippedItem, SyncPlan};

/// Filesystem operations the executor drives.
///
/// Creation primitives must replace an existing entry at the target path.
/// `remove_entry` must not follow links and returns `Ok(false)` when nothing
/// was there.
pub trait EntryPrimitives {
    fn link_directory(
        &self,
        source: &Path,
        target: &Path,
        kind: DirectoryLinkKind,
    ) -> mirror_fs::Result<()>;
    fn link_file(&self, source: &Path, target: &Path) -> mirror_fs::Result<()>;
    fn copy_file(&self, source: &Path, target: &Path) -> mirror_fs::Result<u64>;
    fn remove_entry(&self, path: &Path) -> mirror_fs::Result<bool>;
    /// Link-aware existence check: a broken link counts as existing
    fn entry_exists(&self, path: &Path) -> bool;
    /// Whether an item's media file is present in the library
    fn source_exists(&self, path: &Path) -> bool;
}

/// [`EntryPrimitives`] backed by the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePrimitives;

impl EntryPrimitives for NativePrimitives {
    fn link_directory(
        &self,
        source: &Path,
        target: &Path,
        kind: DirectoryLinkKind,
    ) -> mirror_fs::Result<()> {
        mirror_fs::link::link_directory(source, target, kind)
    }

    fn link_file(&self, source: &Path, target: &Path) -> mirror_fs::Result<()> {
        mirror_fs::link::link_file(source, target)
    }

    fn copy_file(&self, source: &Path, target: &Path) -> mirror_fs::Result<u64> {
        mirror_fs::link::copy_file(source, target)
    }

    fn remove_entry(&self, path: &Path) -> mirror_fs::Result<bool> {
        mirror_fs::link::remove_entry(path)
    }

    fn entry_exists(&self, path: &Path) -> bool {
        mirror_fs::link::entry_exists(path)
    }

    fn source_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Inputs to [`execute`] besides the plan itself.
pub struct ExecOptions<'a> {
    /// Library root; item storage directories live under `images/`
    pub library_root: Option<NormalizedPath>,
    /// Directory link flavour for entry-directory mode
    pub link_type: LinkType,
    pub primitives: &'a dyn EntryPrimitives,
}

impl<'a> ExecOptions<'a> {
    pub fn new(primitives: &'a dyn EntryPrimitives) -> Self {
        Self {
            library_root: None,
            link_type: LinkType::default(),
            primitives,
        }
    }

    pub fn with_library_root(mut self, root: impl Into<NormalizedPath>) -> Self {
        self.library_root = Some(root.into());
        self
    }

    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = link_type;
        self
    }
}

/// Category of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The OS refused the operation; needs user remediation
    PermissionDenied,
    OperationFailed,
}

impl From<ErrorClass> for FailureKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::PermissionDenied => Self::PermissionDenied,
            ErrorClass::Other => Self::OperationFailed,
        }
    }
}

/// One failed creation or removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    /// Set for creation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    /// Set for removal failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<NormalizedPath>,
    pub kind: FailureKind,
    pub message: String,
}

impl SyncFailure {
    fn for_item(item: &Item, error: &mirror_fs::Error) -> Self {
        Self {
            item: Some(item.clone()),
            path: None,
            kind: classify_fs(error).into(),
            message: error.to_string(),
        }
    }

    fn for_path(path: &NormalizedPath, error: &mirror_fs::Error) -> Self {
        Self {
            item: None,
            path: Some(path.clone()),
            kind: classify_fs(error).into(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub created_count: usize,
    pub removed_count: usize,
    pub skipped_count: usize,
    /// Index describing the target directory after this run
    pub new_index: SyncIndex,
    pub errors: Vec<SyncFailure>,
    pub skipped: Vec<SkippedItem>,
}

impl SyncResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether any failure needs elevated rights or developer mode to fix
    pub fn has_permission_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|failure| failure.kind == FailureKind::PermissionDenied)
    }

    /// Paths whose removal failed and that no entry of `new_index` owns.
    ///
    /// Nothing in the index points at them any more, so the caller has to
    /// carry them to the next run for another removal attempt.
    pub fn unremoved_paths(&self) -> BTreeSet<NormalizedPath> {
        let owned: BTreeSet<&NormalizedPath> = self.new_index.paths().collect();
        self.errors
            .iter()
            .filter(|failure| failure.item.is_none())
            .filter_map(|failure| failure.path.clone())
            .filter(|path| !owned.contains(path))
            .collect()
    }
}

/// Apply `plan` and return the outcome with the updated index.
///
/// `previous` is not modified; the working copy becomes
/// [`SyncResult::new_index`]. An item whose creation fails or is skipped
/// has no entry in it, even if `previous` held one under another path.
pub fn execute(
    plan: &SyncPlan,
    mode: SyncMode,
    previous: &SyncIndex,
    options: &ExecOptions<'_>,
) -> SyncResult {
    info!(
        mode = %mode,
        create = plan.to_create.len(),
        remove = plan.to_remove.len(),
        "Executing sync plan"
    );

    let mut result = SyncResult {
        new_index: previous.clone(),
        skipped: plan.skipped.clone(),
        ..SyncResult::default()
    };

    // Index repair happens right after removals so a creation that reuses a
    // freed path keeps its new entry.
    for path in &plan.to_remove {
        if remove_target(path, options.primitives, &mut result) {
            result.new_index.remove_path(path);
        }
    }

    for entry in &plan.to_create {
        create_entry(entry, mode, options, &mut result);
    }

    result.skipped_count = result.skipped.len();

    info!(
        created = result.created_count,
        removed = result.removed_count,
        skipped = result.skipped_count,
        errors = result.errors.len(),
        "Sync plan executed"
    );

    result
}

/// Remove one target path. Returns whether the path is gone afterwards.
fn remove_target(
    path: &NormalizedPath,
    primitives: &dyn EntryPrimitives,
    result: &mut SyncResult,
) -> bool {
    let native = path.to_native();
    if !primitives.entry_exists(&native) {
        debug!(path = %path, "Entry already absent");
        return true;
    }

    match primitives.remove_entry(&native) {
        Ok(removed) => {
            if removed {
                result.removed_count += 1;
                debug!(path = %path, "Removed entry");
            }
            true
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to remove entry");
            result.errors.push(SyncFailure::for_path(path, &e));
            false
        }
    }
}

fn create_entry(
    entry: &PlannedEntry,
    mode: SyncMode,
    options: &ExecOptions<'_>,
    result: &mut SyncResult,
) {
    let PlannedEntry { item, target } = entry;
    let target_native = target.to_native();
    let primitives = options.primitives;

    let outcome = match mode {
        SyncMode::EntryDirectory => match storage_dir(item, options.library_root.as_ref()) {
            Some(source) => {
                primitives.link_directory(&source, &target_native, options.link_type.into())
            }
            None => {
                let error = Error::MissingLibraryRoot {
                    mode: mode.to_string(),
                };
                warn!(id = %item.id, error = %error, "Failed to create entry");
                result.new_index.remove(&item.id);
                result.errors.push(SyncFailure {
                    item: Some(item.clone()),
                    path: None,
                    kind: FailureKind::OperationFailed,
                    message: error.to_string(),
                });
                return;
            }
        },
        SyncMode::EntryFile | SyncMode::Copy => {
            if !primitives.source_exists(&item.source_path) {
                let reason = SkipReason::SourceMissing {
                    path: NormalizedPath::new(&item.source_path),
                };
                warn!(id = %item.id, reason = %reason, "Skipping item");
                result.new_index.remove(&item.id);
                result.skipped.push(SkippedItem {
                    item: item.clone(),
                    reason,
                });
                return;
            }
            if mode == SyncMode::Copy {
                primitives.copy_file(&item.source_path, &target_native).map(|_| ())
            } else {
                primitives.link_file(&item.source_path, &target_native)
            }
        }
    };

    match outcome {
        Ok(()) => {
            // The overwrite replaced whatever else was recorded at this path
            result.new_index.remove_path(target);
            result.new_index.insert(item.id.clone(), target.clone());
            result.created_count += 1;
            debug!(id = %item.id, path = %target, "Created entry");
        }
        Err(e) => {
            warn!(id = %item.id, path = %target, error = %e, "Failed to create entry");
            result.new_index.remove(&item.id);
            result.errors.push(SyncFailure::for_item(item, &e));
        }
    }
}

/// The item's storage directory, `images/{id}.info` under the library root.
///
/// Without a configured root, the directory holding the media file is used.
fn storage_dir(item: &Item, library_root: Option<&NormalizedPath>) -> Option<PathBuf> {
    match library_root {
        Some(root) => {
            let folder = format!("{}{}", item.id, INFO_SUFFIX);
            Some(root.join(IMAGES_DIR).join(&folder).to_native())
        }
        None => item
            .source_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf),
    }
}
