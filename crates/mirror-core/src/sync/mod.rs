//! Reconciliation of the target directory
//!
//! This module provides:
//! - **executor**: apply a plan through filesystem primitives
//! - **classify**: split filesystem failures into permission and other
//! - **engine**: run lock, index persistence, preview, sync and check

mod check;
pub mod classify;
mod engine;
pub mod executor;

pub use check::{CheckReport, CheckStatus, DriftItem, DriftKind};
pub use classify::{ErrorClass, classify};
pub use engine::{SyncEngine, SyncOptions, SyncReport};
pub use executor::{
    EntryPrimitives, ExecOptions, FailureKind, NativePrimitives, SyncFailure, SyncResult, execute,
};
