//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
///
/// Only run-level failures live here. Per-item failures during execution are
/// collected into [`crate::sync::SyncFailure`] and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mode string is not one of the three known modes
    #[error("Unsupported mode: {mode}")]
    UnsupportedMode { mode: String },

    /// Link type string is not recognized
    #[error("Unsupported link type: {link_type}")]
    UnsupportedLinkType { link_type: String },

    /// The target directory could not be created or accessed
    #[error("Target directory {path} is unavailable: {source}")]
    TargetDirUnavailable {
        path: PathBuf,
        #[source]
        source: mirror_fs::Error,
    },

    /// Another run holds the run lock for this profile
    #[error("A sync run is already in progress (lock held on {path})")]
    RunInProgress { path: PathBuf },

    /// Library directory does not exist or has no item store
    #[error("Library not found at {path}")]
    LibraryNotFound { path: PathBuf },

    /// A library item folder whose metadata could not be used
    #[error("Invalid catalog entry at {path}: {message}")]
    CatalogEntry { path: PathBuf, message: String },

    /// Mode requires a library root that was not configured
    #[error("Mode {mode} requires a library root")]
    MissingLibraryRoot { mode: String },

    /// Profile configuration not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
