//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mirror_fs::ProfilePath;

/// Library Mirror - Keep a folder in sync with a filtered view of a media library
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile directory holding config.toml and the index
    #[arg(
        long,
        global = true,
        env = "MIRROR_PROFILE",
        default_value = ProfilePath::ProfileDir.as_str()
    )]
    pub profile: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a mirror profile
    ///
    /// Writes config.toml into the profile directory.
    ///
    /// Examples:
    ///   mirror init --library ~/Photos.library --target ~/Desktop/Travel --tag travel
    ///   mirror init --library ./Lib.library --target ./out --mode copy --ext jpg
    Init {
        /// Library root directory
        #[arg(long)]
        library: PathBuf,

        /// Directory the mirror is maintained in
        #[arg(long)]
        target: PathBuf,

        /// entry-directory, entry-file or copy
        #[arg(short, long, default_value = "entry-file")]
        mode: String,

        /// Directory link flavour for entry-directory mode (junction or symbolic-directory-link)
        #[arg(long, default_value = "junction")]
        link_type: String,

        /// Mirror items carrying any of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Mirror items with one of these extensions
        #[arg(short, long = "ext")]
        extensions: Vec<String>,

        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },

    /// Preview what sync would change
    Plan {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Reconcile the target directory with the library
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Compare the target directory with the stored index
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show profile and index overview
    Status,
}
