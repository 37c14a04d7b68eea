//! Library catalog
//!
//! Reads item metadata from a library on disk. A library keeps one folder
//! per item under `images/`, named `{id}.info`, holding a `metadata.json`
//! and the media file `{name}.{ext}`.

mod filter;

pub use filter::ItemFilter;

use std::fs;
use std::path::{Path, PathBuf};

use mirror_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::item::Item;
use crate::{Error, Result};

/// Directory under the library root holding item folders
pub const IMAGES_DIR: &str = "images";

/// Metadata file inside each item folder
pub const METADATA_FILE: &str = "metadata.json";

/// Suffix of item folder names
pub const INFO_SUFFIX: &str = ".info";

/// One item as described by its metadata file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub ext: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of the library folders the item belongs to
    #[serde(default)]
    pub folders: Vec<String>,
    /// Item sits in the library's trash
    #[serde(default)]
    pub is_deleted: bool,
    /// Milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<i64>,
    /// The item's folder on disk
    #[serde(skip)]
    pub info_dir: PathBuf,
}

impl CatalogEntry {
    /// Path of the media file inside the item folder
    pub fn media_path(&self) -> PathBuf {
        let file_name = if self.ext.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.ext)
        };
        self.info_dir.join(file_name)
    }

    pub fn to_item(&self) -> Item {
        Item::new(&self.id, &self.name, &self.ext, self.media_path())
    }
}

/// Anything that can list catalog entries
pub trait ItemSource {
    /// All entries, in a stable order
    fn entries(&self) -> Result<Vec<CatalogEntry>>;
}

/// Catalog over a library directory
#[derive(Debug, Clone)]
pub struct LibraryCatalog {
    root: NormalizedPath,
    store: ConfigStore,
}

impl LibraryCatalog {
    /// Open the library at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LibraryNotFound`] when `path` has no `images/`
    /// directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = NormalizedPath::new(path.as_ref());
        if !root.join(IMAGES_DIR).is_dir() {
            return Err(Error::LibraryNotFound {
                path: path.as_ref().to_path_buf(),
            });
        }
        Ok(Self {
            root,
            store: ConfigStore::new(),
        })
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn load_entry(&self, info_dir: &Path) -> Result<CatalogEntry> {
        let metadata_path = NormalizedPath::new(info_dir.join(METADATA_FILE));
        let mut entry: CatalogEntry = self.store.load(&metadata_path)?;

        let expected = format!("{}{}", entry.id, INFO_SUFFIX);
        let folder = info_dir.file_name().map(|name| name.to_string_lossy());
        if folder.as_deref() != Some(expected.as_str()) {
            return Err(Error::CatalogEntry {
                path: info_dir.to_path_buf(),
                message: format!("metadata id {} does not match folder name", entry.id),
            });
        }

        entry.info_dir = info_dir.to_path_buf();
        Ok(entry)
    }
}

impl ItemSource for LibraryCatalog {
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let images = self.root.join(IMAGES_DIR).to_native();
        let dir = fs::read_dir(&images).map_err(|e| Error::Fs(mirror_fs::Error::io(&images, e)))?;

        let mut entries = Vec::new();
        for dir_entry in dir.flatten() {
            let path = dir_entry.path();
            let is_info_dir = path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().ends_with(INFO_SUFFIX));
            if !is_info_dir {
                continue;
            }

            match self.load_entry(&path) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping library folder"),
            }
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(library = %self.root, count = entries.len(), "Read library catalog");

        Ok(entries)
    }
}
