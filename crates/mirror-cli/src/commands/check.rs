//! Check command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{CheckStatus, DriftItem, SyncEngine};

use crate::error::Result;

fn print_items(marker: colored::ColoredString, items: &[DriftItem]) {
    for item in items {
        println!(
            "   {} {} ({}): {}",
            marker,
            item.path.as_str().cyan(),
            item.id.dimmed(),
            item.description
        );
    }
}

/// Run the check command
///
/// Compares the target directory with the stored index. Read only.
pub fn run_check(profile: &Path, json: bool) -> Result<()> {
    let engine = SyncEngine::open(profile)?;
    let report = engine.check()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} Checking {} indexed entries...", "=>".blue().bold(), report.checked);

    match report.status {
        CheckStatus::Healthy => {
            println!("{} Mirror is healthy. No drift detected.", "OK".green().bold());
        }
        CheckStatus::Missing => {
            println!("{} Some entries are missing:", "MISSING".yellow().bold());
            print_items("-".yellow(), &report.missing);
            println!();
            println!("Entries stay indexed until the item leaves the selection.");
        }
        CheckStatus::Drifted => {
            println!("{} Some entries have drifted:", "DRIFTED".red().bold());
            print_items("!".red(), &report.drifted);
            if !report.missing.is_empty() {
                println!();
                println!("{} Also missing:", "MISSING".yellow().bold());
                print_items("-".yellow(), &report.missing);
            }
        }
        CheckStatus::Broken => {
            println!("{} The index is unreadable:", "BROKEN".red().bold());
        }
    }

    for message in &report.messages {
        println!("   {} {}", "i".blue(), message);
    }

    Ok(())
}
