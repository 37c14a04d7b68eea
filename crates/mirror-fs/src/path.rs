//! Separator-agnostic paths for index entries and plan targets

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A path kept in forward-slash form.
///
/// Index entries and plan targets are stored as `NormalizedPath` so two
/// spellings of one location (`C:\mirror\x.png` and `C:/mirror/x.png`)
/// compare and hash equal. Conversion back to a native [`PathBuf`] happens
/// only when touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Normalize any path-like value.
    ///
    /// Backslashes become slashes, runs of separators collapse to one
    /// (a leading `//` survives for UNC shares) and a trailing separator
    /// is dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self { inner: clean(&raw) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native form for I/O.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append one or more components; `""` and `"."` leave the path as is.
    pub fn join(&self, segment: &str) -> Self {
        let tail = segment.replace('\\', "/");
        match (self.inner.as_str(), tail.as_str()) {
            (_, "" | ".") => self.clone(),
            ("", _) => Self::new(tail),
            (head, _) if head.ends_with('/') => Self {
                inner: clean(&format!("{}{}", head, tail)),
            },
            (head, _) => Self {
                inner: clean(&format!("{}/{}", head, tail)),
            },
        }
    }

    /// Containing directory, or `None` for a root or a bare name.
    pub fn parent(&self) -> Option<Self> {
        let (head, name) = self.inner.rsplit_once('/')?;
        if name.is_empty() {
            return None;
        }
        if head.is_empty() {
            // "/name" lives in "/", but "/" itself has no parent
            return (self.inner.len() > 1).then(|| Self { inner: "/".into() });
        }
        if head == "/" {
            // network prefix "//server"
            return None;
        }
        Some(Self { inner: head.to_string() })
    }

    /// Last component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether something is at this path, following links.
    ///
    /// A broken link reports `false`; [`crate::link::entry_exists`] sees
    /// the link itself.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Text after the last dot of the file name; dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// Collapse duplicate separators and strip a trailing one.
fn clean(path: &str) -> String {
    let network = path.starts_with("//") && !path.starts_with("///");
    let mut out = String::with_capacity(path.len());
    if network {
        out.push_str("//");
    } else if path.starts_with('/') {
        out.push('/');
    }

    let mut first = true;
    for component in path.split('/').filter(|c| !c.is_empty()) {
        if !first {
            out.push('/');
        }
        out.push_str(component);
        first = false;
    }

    // "C:" alone would mean the drive's current directory
    if out.len() == 2 && out.ends_with(':') && path.len() > 2 {
        out.push('/');
    }
    out
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}
