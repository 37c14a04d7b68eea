//! Well-known names inside a mirror profile directory.

use std::path::Path;

/// Files and directories that make up a mirror profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePath {
    /// The `.mirror` directory (profile root)
    ProfileDir,
    /// The `config.toml` profile configuration
    Config,
    /// The `index.toml` ledger of produced entries
    Index,
    /// The `run.lock` file serializing reconciliation runs
    RunLock,
}

impl ProfilePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileDir => ".mirror",
            Self::Config => "config.toml",
            Self::Index => "index.toml",
            Self::RunLock => "run.lock",
        }
    }
}

impl AsRef<Path> for ProfilePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for ProfilePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ProfilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
