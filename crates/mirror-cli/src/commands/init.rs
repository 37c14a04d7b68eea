//! Init command implementation
//!
//! Creates a mirror profile with its config.toml.

use std::path::{Path, PathBuf};

use colored::Colorize;
use mirror_core::{ItemFilter, LibraryCatalog, LinkType, MirrorConfig, SyncMode};

use crate::error::{CliError, Result};

/// Arguments of `mirror init`
#[derive(Debug, Clone)]
pub struct InitArgs {
    pub library: PathBuf,
    pub target: PathBuf,
    pub mode: String,
    pub link_type: String,
    pub tags: Vec<String>,
    pub extensions: Vec<String>,
    pub force: bool,
}

/// Run the init command
pub fn run_init(profile: &Path, args: &InitArgs) -> Result<()> {
    let config = build_config(args)?;

    let config_path = MirrorConfig::path_in(profile);
    if config_path.exists() && !args.force {
        return Err(CliError::user(format!(
            "Profile already exists at {}. Use --force to overwrite.",
            config_path
        )));
    }

    println!(
        "{} Creating mirror profile in {} mode...",
        "=>".blue().bold(),
        config.mirror.mode.as_str().cyan()
    );
    println!("   Library: {}", config.library.path.display().to_string().yellow());
    println!("   Target:  {}", config.mirror.target_dir.display().to_string().yellow());
    if !args.tags.is_empty() {
        println!("   Tags: {}", args.tags.join(", ").yellow());
    }
    if !args.extensions.is_empty() {
        println!("   Extensions: {}", args.extensions.join(", ").yellow());
    }

    config.save(profile)?;

    println!("{} Profile written to {}", "OK".green().bold(), config_path);
    println!("Run {} to preview.", "mirror plan".cyan());
    Ok(())
}

/// Validate the arguments and turn them into a config with absolute paths
fn build_config(args: &InitArgs) -> Result<MirrorConfig> {
    let mode: SyncMode = args.mode.parse()?;
    let link_type: LinkType = args.link_type.parse()?;

    let library = std::path::absolute(&args.library)?;
    LibraryCatalog::open(&library)?;
    let target = std::path::absolute(&args.target)?;

    let mut config = MirrorConfig::new(library, target, mode);
    config.mirror.link_type = link_type;
    config.filter = ItemFilter {
        any_tags: args.tags.clone(),
        extensions: args.extensions.clone(),
        ..ItemFilter::default()
    };
    Ok(config)
}
