//! Item, mode and link-type types shared by planning and execution

use std::path::PathBuf;
use std::str::FromStr;

use mirror_fs::DirectoryLinkKind;
use serde::{Deserialize, Serialize};

use crate::Error;

/// One library item the mirror may expose.
///
/// Identity is `id`; it is stable across runs and library moves. The engine
/// never modifies items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Opaque unique identifier
    pub id: String,
    /// Display name without extension
    pub name: String,
    /// File extension without the leading dot
    pub extension: String,
    /// Path of the item's media file inside the library
    pub source_path: PathBuf,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        extension: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extension: extension.into(),
            source_path: source_path.into(),
        }
    }
}

/// How items are materialized in the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Link each item's whole storage directory as `{id}.info`
    EntryDirectory,
    /// Link each item's media file under its display name
    EntryFile,
    /// Copy each item's media file under its display name
    Copy,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryDirectory => "entry-directory",
            Self::EntryFile => "entry-file",
            Self::Copy => "copy",
        }
    }
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry-directory" => Ok(Self::EntryDirectory),
            "entry-file" => Ok(Self::EntryFile),
            "copy" => Ok(Self::Copy),
            _ => Err(Error::UnsupportedMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory link flavour for [`SyncMode::EntryDirectory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    #[default]
    Junction,
    SymbolicDirectoryLink,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Junction => "junction",
            Self::SymbolicDirectoryLink => "symbolic-directory-link",
        }
    }
}

impl FromStr for LinkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junction" => Ok(Self::Junction),
            "symbolic-directory-link" | "symlink" => Ok(Self::SymbolicDirectoryLink),
            _ => Err(Error::UnsupportedLinkType {
                link_type: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LinkType> for DirectoryLinkKind {
    fn from(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Junction => DirectoryLinkKind::Junction,
            LinkType::SymbolicDirectoryLink => DirectoryLinkKind::Symlink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_known_values() {
        assert_eq!("entry-directory".parse::<SyncMode>().unwrap(), SyncMode::EntryDirectory);
        assert_eq!("entry-file".parse::<SyncMode>().unwrap(), SyncMode::EntryFile);
        assert_eq!("copy".parse::<SyncMode>().unwrap(), SyncMode::Copy);
    }

    #[test]
    fn mode_rejects_unknown_value() {
        let err = "hardlink".parse::<SyncMode>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMode { ref mode } if mode == "hardlink"));
    }

    #[test]
    fn mode_display_round_trips() {
        for mode in [SyncMode::EntryDirectory, SyncMode::EntryFile, SyncMode::Copy] {
            assert_eq!(mode.to_string().parse::<SyncMode>().unwrap(), mode);
        }
    }

    #[test]
    fn link_type_accepts_symlink_alias() {
        assert_eq!(
            "symlink".parse::<LinkType>().unwrap(),
            LinkType::SymbolicDirectoryLink
        );
        assert!("hardlink".parse::<LinkType>().is_err());
    }
}
