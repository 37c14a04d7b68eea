//! Plan computation
//!
//! Compares the desired item set against the previous index and decides
//! which entries to create (and under which name) and which to remove.
//! Planning never touches the filesystem, so it doubles as a preview.

use std::collections::{BTreeSet, HashSet};

use mirror_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::index::SyncIndex;
use crate::item::{Item, SyncMode};
use crate::naming;

/// One entry to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub item: Item,
    pub target: NormalizedPath,
}

/// Why an item was not materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The item's media file does not exist
    SourceMissing { path: NormalizedPath },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing { path } => write!(f, "source file missing: {}", path),
        }
    }
}

/// An item left out of a run, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub item: Item,
    pub reason: SkipReason,
}

/// The work one run has to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Entries to create, in the caller's item order
    pub to_create: Vec<PlannedEntry>,
    /// Target paths to remove
    pub to_remove: BTreeSet<NormalizedPath>,
    /// Filled in during execution; always empty after planning
    pub skipped: Vec<SkippedItem>,
}

impl SyncPlan {
    /// Whether the plan has nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the plan that moves the target directory from `previous` to the
/// `desired` item set.
///
/// Names of entries that stay are reserved first; names of entries being
/// removed are free for reuse. New items then claim names in the order they
/// appear in `desired`, so the first item to render a given name keeps it and
/// later ones get the id-suffixed form. If an id appears more than once, only
/// its first occurrence is planned.
pub fn compute_plan(
    desired: &[Item],
    previous: &SyncIndex,
    mode: SyncMode,
    target_dir: &NormalizedPath,
) -> SyncPlan {
    let desired_ids: HashSet<&str> = desired.iter().map(|item| item.id.as_str()).collect();

    let reserved: HashSet<String> = previous
        .iter()
        .filter(|(id, _)| desired_ids.contains(id))
        .filter_map(|(_, path)| naming::path_key(path))
        .collect();

    let to_create = assign_names(desired, previous, mode, target_dir, reserved);

    let to_remove: BTreeSet<NormalizedPath> = previous
        .iter()
        .filter(|(id, _)| !desired_ids.contains(id))
        .map(|(_, path)| path.clone())
        .collect();

    debug!(
        create = to_create.len(),
        remove = to_remove.len(),
        kept = previous.len().saturating_sub(to_remove.len()),
        "Computed sync plan"
    );

    SyncPlan {
        to_create,
        to_remove,
        skipped: Vec::new(),
    }
}

/// Plan a full rebuild against an index produced under another mode or
/// target directory.
///
/// Every stored entry is removed and every desired item is created afresh,
/// since both names and entry kinds may differ.
pub fn compute_replacement_plan(
    desired: &[Item],
    stale: &SyncIndex,
    mode: SyncMode,
    target_dir: &NormalizedPath,
) -> SyncPlan {
    let mut plan = compute_plan(desired, &SyncIndex::new(), mode, target_dir);
    plan.to_remove = stale.paths().cloned().collect();
    plan
}

/// Walk new items in order, threading the claimed-name set through a fold.
fn assign_names(
    desired: &[Item],
    previous: &SyncIndex,
    mode: SyncMode,
    target_dir: &NormalizedPath,
    reserved: HashSet<String>,
) -> Vec<PlannedEntry> {
    let (entries, _, _) = desired
        .iter()
        .filter(|item| !previous.contains(&item.id))
        .fold(
            (Vec::new(), reserved, HashSet::new()),
            |(mut entries, mut names, mut seen), item| {
                if !seen.insert(item.id.as_str()) {
                    return (entries, names, seen);
                }
                let target = naming::target_path_for(item, target_dir, mode, &names);
                if let Some(key) = naming::path_key(&target) {
                    names.insert(key);
                }
                entries.push(PlannedEntry {
                    item: item.clone(),
                    target,
                });
                (entries, names, seen)
            },
        );
    entries
}
