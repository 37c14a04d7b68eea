//! Filesystem primitives for Library Mirror
//!
//! Provides normalized path handling, atomic writes, format-agnostic config
//! loading, and the link/copy/remove primitives the reconciliation engine
//! drives.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod link;
pub mod path;

pub use config::ConfigStore;
pub use constants::ProfilePath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use link::DirectoryLinkKind;
pub use path::NormalizedPath;
