//! [`TestLibrary`] builder for mirror test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

/// A temporary workspace holding a library, a target directory and a
/// profile directory side by side:
///
/// ```text
/// <tmp>/Photos.library/images/{id}.info/{metadata.json, name.ext}
/// <tmp>/mirror/
/// <tmp>/.mirror/
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::library::TestLibrary;
///
/// let mut lib = TestLibrary::new();
/// lib.add_item("KX1", "sunset", "png", &["travel"]);
/// lib.assert_exists("Photos.library/images/KX1.info/sunset.png");
/// ```
pub struct TestLibrary {
    temp_dir: TempDir,
}

impl Default for TestLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLibrary {
    /// Create a library with an empty `images/` directory.
    pub fn new() -> Self {
        let lib = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(lib.path().join("images")).unwrap();
        lib
    }

    /// Root of the temporary workspace.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Library root directory.
    pub fn path(&self) -> PathBuf {
        self.root().join("Photos.library")
    }

    /// Default target directory (not created).
    pub fn target(&self) -> PathBuf {
        self.root().join("mirror")
    }

    /// Default profile directory (not created).
    pub fn profile(&self) -> PathBuf {
        self.root().join(".mirror")
    }

    /// Storage folder of an item.
    pub fn info_dir(&self, id: &str) -> PathBuf {
        self.path().join("images").join(format!("{}.info", id))
    }

    /// Media file of an item.
    pub fn media_path(&self, id: &str, name: &str, ext: &str) -> PathBuf {
        self.info_dir(id).join(format!("{}.{}", name, ext))
    }

    /// Add an item with its metadata and a media file whose content names
    /// the item.
    pub fn add_item(&mut self, id: &str, name: &str, ext: &str, tags: &[&str]) -> &mut Self {
        self.write_metadata(id, name, ext, tags, false);
        fs::write(self.media_path(id, name, ext), format!("media of {}", id)).unwrap();
        self
    }

    /// Add an item that sits in the library trash.
    pub fn add_deleted_item(&mut self, id: &str, name: &str, ext: &str) -> &mut Self {
        self.write_metadata(id, name, ext, &[], true);
        fs::write(self.media_path(id, name, ext), format!("media of {}", id)).unwrap();
        self
    }

    /// Rewrite an item's metadata, keeping its media file.
    pub fn set_tags(&mut self, id: &str, name: &str, ext: &str, tags: &[&str]) -> &mut Self {
        self.write_metadata(id, name, ext, tags, false);
        self
    }

    /// Delete an item's media file but keep its metadata.
    pub fn remove_media(&mut self, id: &str, name: &str, ext: &str) -> &mut Self {
        fs::remove_file(self.media_path(id, name, ext)).unwrap();
        self
    }

    /// Delete an item's whole storage folder.
    pub fn remove_item(&mut self, id: &str) -> &mut Self {
        fs::remove_dir_all(self.info_dir(id)).unwrap();
        self
    }

    fn write_metadata(&self, id: &str, name: &str, ext: &str, tags: &[&str], deleted: bool) {
        let dir = self.info_dir(id);
        fs::create_dir_all(&dir).unwrap();
        let metadata = json!({
            "id": id,
            "name": name,
            "ext": ext,
            "tags": tags,
            "folders": [],
            "isDeleted": deleted,
            "modificationTime": 1_700_000_000_000_i64,
        });
        let content = serde_json::to_string_pretty(&metadata).unwrap();
        fs::write(dir.join("metadata.json"), content).unwrap();
    }

    /// Assert that `path` (relative to the workspace root) exists, counting
    /// dangling links.
    ///
    /// # Panics
    /// Panics with a descriptive message if nothing is at the path.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            fs::symlink_metadata(&full_path).is_ok(),
            "Expected entry to exist: {}",
            full_path.display()
        );
    }

    /// Assert that nothing, not even a dangling link, is at `path`.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            fs::symlink_metadata(&full_path).is_err(),
            "Expected entry NOT to exist: {}",
            full_path.display()
        );
    }

    /// Sorted file names in the target directory.
    pub fn target_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(self.target()) {
            Ok(entries) => entries
                .flatten()
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}
