//! Shared test utilities for the library-mirror workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`library`]: [`TestLibrary`](library::TestLibrary) builder laying out a
//!   media library next to a target directory and profile

pub mod library;
