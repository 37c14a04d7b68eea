//! Mirror profile configuration
//!
//! A profile directory (`.mirror/` by default) holds `config.toml` naming
//! the library, the target directory, the mode and the item filter:
//!
//! ```toml
//! [library]
//! path = "../Photos.library"
//!
//! [mirror]
//! mode = "entry-file"
//! target_dir = "../mirror"
//! link_type = "junction"
//!
//! [filter]
//! any_tags = ["travel"]
//! ```
//!
//! Relative paths resolve against the profile directory's parent, and `.`
//! and `..` are folded lexically so one profile reached through different
//! spellings resolves to the same directories.

use std::path::{Component, Path, PathBuf};

use mirror_fs::{ConfigStore, NormalizedPath, ProfilePath};
use serde::{Deserialize, Serialize};

use crate::catalog::ItemFilter;
use crate::item::{LinkType, SyncMode};
use crate::{Error, Result};

/// Library section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySection {
    /// Library root directory
    pub path: PathBuf,
}

fn default_mode() -> SyncMode {
    SyncMode::EntryFile
}

/// Mirror section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSection {
    #[serde(default = "default_mode")]
    pub mode: SyncMode,
    /// Directory the mirror is maintained in
    pub target_dir: PathBuf,
    /// Only used by entry-directory mode
    #[serde(default)]
    pub link_type: LinkType,
}

/// Contents of a profile's `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub library: LibrarySection,
    pub mirror: MirrorSection,
    #[serde(default)]
    pub filter: ItemFilter,
}

impl MirrorConfig {
    pub fn new(
        library: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        mode: SyncMode,
    ) -> Self {
        Self {
            library: LibrarySection { path: library.into() },
            mirror: MirrorSection {
                mode,
                target_dir: target_dir.into(),
                link_type: LinkType::default(),
            },
            filter: ItemFilter::default(),
        }
    }

    /// Path of the config file inside `profile_dir`
    pub fn path_in(profile_dir: &Path) -> NormalizedPath {
        NormalizedPath::new(profile_dir).join(ProfilePath::Config.as_str())
    }

    /// Load the profile's configuration as stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the profile has no config file.
    pub fn load(profile_dir: &Path) -> Result<Self> {
        let path = Self::path_in(profile_dir);
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_native(),
            });
        }
        Ok(ConfigStore::new().load(&path)?)
    }

    /// Write the configuration into `profile_dir` atomically.
    pub fn save(&self, profile_dir: &Path) -> Result<()> {
        ConfigStore::new().save(&Self::path_in(profile_dir), self)?;
        Ok(())
    }

    /// Copy of this config with relative paths made absolute against the
    /// parent of `profile_dir`.
    pub fn resolved(&self, profile_dir: &Path) -> Self {
        let base = profile_base(profile_dir);
        let mut config = self.clone();
        config.library.path = resolve(&base, &self.library.path);
        config.mirror.target_dir = resolve(&base, &self.mirror.target_dir);
        config
    }
}

fn profile_base(profile_dir: &Path) -> PathBuf {
    let absolute = if profile_dir.is_absolute() {
        profile_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(profile_dir))
            .unwrap_or_else(|_| profile_dir.to_path_buf())
    };
    let absolute = fold_dots(&absolute);
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(absolute)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        fold_dots(path)
    } else {
        fold_dots(&base.join(path))
    }
}

/// Drop `.` components and let `..` cancel the component before it.
///
/// Purely lexical: links are not consulted. A `..` at the root is dropped;
/// leading `..` of a relative path are kept.
fn fold_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
