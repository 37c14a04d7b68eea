//! Check types for SyncEngine validation
//!
//! Reports how the target directory compares with the stored index.

use mirror_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// Overall result of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Every indexed entry is present and intact
    Healthy,
    /// Some indexed entries are gone from the target directory
    Missing,
    /// Some entries are dangling links or stale copies
    Drifted,
    /// The index is unreadable
    Broken,
}

/// What is wrong with one indexed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// Nothing exists at the path
    Missing,
    /// A link whose library target no longer exists
    Dangling,
    /// A copy whose content differs from the library file
    Drifted,
}

/// An indexed entry that does not match expectations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftItem {
    pub id: String,
    pub path: NormalizedPath,
    pub kind: DriftKind,
    pub description: String,
}

/// Report from a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    /// Dangling links and stale copies
    pub drifted: Vec<DriftItem>,
    /// Entries with nothing on disk
    pub missing: Vec<DriftItem>,
    /// Number of index entries examined
    pub checked: usize,
    pub messages: Vec<String>,
}

impl CheckReport {
    /// Create a healthy check report with no issues
    pub fn healthy(checked: usize) -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
            checked,
            messages: Vec::new(),
        }
    }

    /// Create a check report indicating the index is broken
    pub fn broken(message: String) -> Self {
        Self {
            status: CheckStatus::Broken,
            drifted: Vec::new(),
            missing: Vec::new(),
            checked: 0,
            messages: vec![message],
        }
    }

    /// Build a report from the problems found, picking the worst status.
    ///
    /// Drifted outranks Missing.
    pub fn from_items(checked: usize, items: Vec<DriftItem>) -> Self {
        let (missing, drifted): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.kind == DriftKind::Missing);

        let status = if !drifted.is_empty() {
            CheckStatus::Drifted
        } else if !missing.is_empty() {
            CheckStatus::Missing
        } else {
            CheckStatus::Healthy
        };

        Self {
            status,
            drifted,
            missing,
            checked,
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }
}
