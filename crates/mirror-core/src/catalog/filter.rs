//! Item selection rules

use serde::{Deserialize, Serialize};

use super::CatalogEntry;
use crate::item::Item;

/// Predicate over catalog entries.
///
/// Every non-empty constraint must hold. Comparisons ignore case. Deleted
/// entries are excluded unless `include_deleted` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFilter {
    /// Entry carries at least one of these tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_tags: Vec<String>,
    /// Entry carries every one of these tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_tags: Vec<String>,
    /// Entry belongs to at least one of these library folders
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<String>,
    /// Entry extension is one of these, with or without a leading dot
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    /// Substring of the entry name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    pub include_deleted: bool,
}

impl ItemFilter {
    /// A filter that accepts every live entry
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if entry.is_deleted && !self.include_deleted {
            return false;
        }

        let tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
        let has_tag = |wanted: &String| tags.contains(&wanted.to_lowercase());

        if !self.any_tags.is_empty() && !self.any_tags.iter().any(has_tag) {
            return false;
        }
        if !self.all_tags.iter().all(has_tag) {
            return false;
        }

        if !self.folders.is_empty()
            && !self
                .folders
                .iter()
                .any(|wanted| entry.folders.iter().any(|f| f.eq_ignore_ascii_case(wanted)))
        {
            return false;
        }

        if !self.extensions.is_empty()
            && !self
                .extensions
                .iter()
                .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(&entry.ext))
        {
            return false;
        }

        match &self.name_contains {
            Some(needle) => entry.name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// Items for the matching entries, in catalog order
    pub fn select(&self, entries: &[CatalogEntry]) -> Vec<Item> {
        entries
            .iter()
            .filter(|entry| self.matches(entry))
            .map(CatalogEntry::to_item)
            .collect()
    }
}
