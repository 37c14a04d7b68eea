//! Plan command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{SyncEngine, SyncPlan};

use crate::error::Result;

/// Run the plan command
///
/// Prints what the next sync would create and remove. Touches nothing.
pub fn run_plan(profile: &Path, json: bool) -> Result<()> {
    let engine = SyncEngine::open(profile)?;
    let items = engine.desired_items()?;
    let plan = engine.preview(&items)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!(
        "{} {} item(s) selected for {}",
        "=>".blue().bold(),
        items.len(),
        engine.target_dir().as_str().cyan()
    );
    print_plan(&plan);
    Ok(())
}

/// Human-readable plan listing, shared with `sync --dry-run`
pub fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        println!("{} Already in sync. No changes needed.", "OK".green().bold());
        return;
    }

    for entry in &plan.to_create {
        println!(
            "   {} {} {}",
            "+".green(),
            entry.target.file_name().unwrap_or(entry.target.as_str()),
            format!("({})", entry.item.id).dimmed()
        );
    }
    for path in &plan.to_remove {
        println!("   {} {}", "-".red(), path.file_name().unwrap_or(path.as_str()));
    }
    println!(
        "{} to create, {} to remove",
        plan.to_create.len().to_string().green(),
        plan.to_remove.len().to_string().red()
    );
}
