//! Incremental reconciliation engine for Library Mirror
//!
//! Keeps a target directory congruent with a filtered view of a media
//! library by creating and removing links (or copies), one run at a time:
//!
//! - **Naming**: unique, filesystem-legal entry names per item
//! - **Planning**: creations and removals from the desired set and the stored index
//! - **Execution**: apply a plan, collecting per-item failures
//! - **Index**: the only memory carried between runs, persisted per library
//! - **Catalog**: read items from a library and select them with a filter
//! - **SyncEngine**: run lock, preview, sync and check for one profile
//!
//! # Architecture
//!
//! ```text
//!            mirror-cli
//!                |
//!           mirror-core
//!                |
//!            mirror-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::{SyncEngine, SyncOptions};
//!
//! let engine = SyncEngine::open(".mirror")?;
//! let items = engine.desired_items()?;
//! let report = engine.run(&items, SyncOptions::default())?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod index;
pub mod item;
pub mod naming;
pub mod plan;
pub mod sync;

pub use catalog::{CatalogEntry, ItemFilter, ItemSource, LibraryCatalog};
pub use config::MirrorConfig;
pub use error::{Error, Result};
pub use index::{IndexLedger, LibraryIndex, SyncIndex};
pub use item::{Item, LinkType, SyncMode};
pub use naming::target_path_for;
pub use plan::{
    PlannedEntry, SkipReason, SkippedItem, SyncPlan, compute_plan, compute_replacement_plan,
};
pub use sync::{
    CheckReport, CheckStatus, DriftItem, DriftKind, EntryPrimitives, ErrorClass, ExecOptions,
    FailureKind, NativePrimitives, SyncEngine, SyncFailure, SyncOptions, SyncReport, SyncResult,
    classify, execute,
};
