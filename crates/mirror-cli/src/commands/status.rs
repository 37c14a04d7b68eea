//! Status command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{MirrorConfig, SyncEngine};

use crate::error::Result;

/// Run the status command
pub fn run_status(profile: &Path) -> Result<()> {
    let engine = SyncEngine::open(profile)?;
    let config = engine.config();

    println!(
        "{} Mirror profile {}",
        "=>".blue().bold(),
        MirrorConfig::path_in(profile).as_str().cyan()
    );
    println!("   Library:   {}", config.library.path.display());
    println!("   Target:    {}", config.mirror.target_dir.display());
    println!("   Mode:      {}", config.mirror.mode.as_str().yellow());
    println!("   Link type: {}", config.mirror.link_type);

    let filter = &config.filter;
    if !filter.any_tags.is_empty() {
        println!("   Any tag:   {}", filter.any_tags.join(", "));
    }
    if !filter.all_tags.is_empty() {
        println!("   All tags:  {}", filter.all_tags.join(", "));
    }
    if !filter.extensions.is_empty() {
        println!("   Extensions: {}", filter.extensions.join(", "));
    }

    match engine.stored_index()? {
        Some(stored) => {
            let synced = stored
                .last_synced
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!("   Indexed:   {} entries", stored.index.len().to_string().green());
            println!("   Last sync: {}", synced);
            if stored.is_stale_for(engine.mode(), &engine.target_dir()) {
                println!(
                    "   {} Index was produced with mode {}; the next sync rebuilds the mirror",
                    "!".yellow(),
                    stored.mode
                );
            }
        }
        None => println!("   Indexed:   {}", "not synced yet".dimmed()),
    }

    Ok(())
}
