//! Persistent ledger holding one index per library instance

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use mirror_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use super::SyncIndex;
use crate::Result;
use crate::item::SyncMode;

const LEDGER_VERSION: &str = "1.0";

/// The stored outcome of the last run for one library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryIndex {
    /// Mode the entries were produced with
    pub mode: SyncMode,
    /// Directory the entries live in
    pub target_dir: NormalizedPath,
    /// When the index was last written by a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    /// Paths a run failed to remove after their index entry was gone
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub pending_removals: BTreeSet<NormalizedPath>,
    /// Item id to target path
    #[serde(default)]
    pub index: SyncIndex,
}

impl LibraryIndex {
    pub fn new(mode: SyncMode, target_dir: NormalizedPath, index: SyncIndex) -> Self {
        Self {
            mode,
            target_dir,
            last_synced: None,
            pending_removals: BTreeSet::new(),
            index,
        }
    }

    /// Whether entries were produced under a different mode or directory
    /// than the ones now configured.
    pub fn is_stale_for(&self, mode: SyncMode, target_dir: &NormalizedPath) -> bool {
        self.mode != mode || &self.target_dir != target_dir
    }
}

/// Ledger file mapping library keys to their stored index.
///
/// Saved with [`mirror_fs::io::write_atomic`], so a reader sees either the
/// previous ledger or the new one, never a partial write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexLedger {
    /// Ledger format version for forward compatibility
    version: String,
    /// Stored index per library key
    #[serde(default)]
    libraries: BTreeMap<String, LibraryIndex>,
}

impl Default for IndexLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            libraries: BTreeMap::new(),
        }
    }

    /// Ledger format version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Key identifying a library instance.
    ///
    /// The canonical library path, without the Windows verbatim prefix.
    /// Falls back to the normalized input when the path can not be resolved.
    pub fn key_for(library_path: &Path) -> String {
        dunce::canonicalize(library_path)
            .map(NormalizedPath::new)
            .unwrap_or_else(|_| NormalizedPath::new(library_path))
            .to_string()
    }

    /// Load a ledger from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_text(&NormalizedPath::new(path))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the ledger, or start an empty one if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save the ledger as TOML, replacing the file atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be serialized, the sidecar
    /// lock is not acquired in time, or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        io::write_text(&NormalizedPath::new(path), &content)?;
        Ok(())
    }

    /// Stored index for a library
    pub fn get(&self, key: &str) -> Option<&LibraryIndex> {
        self.libraries.get(key)
    }

    /// Replace the stored index for a library
    pub fn set(&mut self, key: impl Into<String>, library: LibraryIndex) {
        self.libraries.insert(key.into(), library);
    }

    /// All stored libraries
    pub fn libraries(&self) -> impl Iterator<Item = (&str, &LibraryIndex)> {
        self.libraries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
