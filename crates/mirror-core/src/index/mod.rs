//! The index: the engine's only memory of what it produced
//!
//! A [`SyncIndex`] maps item ids to the target path each item occupies. It
//! is carried from one run to the next through the [`IndexLedger`], which
//! persists one index per library instance.

mod ledger;

pub use ledger::{IndexLedger, LibraryIndex};

use std::collections::BTreeMap;

use mirror_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// Mapping from item id to the target path currently occupied by that item.
///
/// Stored as an ordered map so serialized ledgers are stable; iteration
/// order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncIndex {
    entries: BTreeMap<String, NormalizedPath>,
}

impl SyncIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target path recorded for `id`
    pub fn get(&self, id: &str) -> Option<&NormalizedPath> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Record `id → path`, returning the previous path if any
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        path: NormalizedPath,
    ) -> Option<NormalizedPath> {
        self.entries.insert(id.into(), path)
    }

    pub fn remove(&mut self, id: &str) -> Option<NormalizedPath> {
        self.entries.remove(id)
    }

    /// Remove every entry whose value is `path`.
    ///
    /// The index is keyed by id, so this is a linear scan. Returns the ids
    /// that were dropped.
    pub fn remove_path(&mut self, path: &NormalizedPath) -> Vec<String> {
        let ids: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, p)| *p == path)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &ids {
            self.entries.remove(id);
        }
        ids
    }

    /// Iterate `(id, path)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedPath)> {
        self.entries.iter().map(|(id, path)| (id.as_str(), path))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries.values()
    }
}

impl FromIterator<(String, NormalizedPath)> for SyncIndex {
    fn from_iter<I: IntoIterator<Item = (String, NormalizedPath)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
