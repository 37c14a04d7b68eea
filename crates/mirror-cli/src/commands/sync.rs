//! Sync command implementation

use std::path::Path;

use colored::Colorize;
use mirror_core::{FailureKind, SyncEngine, SyncOptions, SyncResult};

use super::plan::print_plan;
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Reconciles the target directory once. Fails with a non-zero exit when
/// any entry could not be created or removed.
pub fn run_sync(profile: &Path, dry_run: bool, json: bool) -> Result<()> {
    let engine = SyncEngine::open(profile)?;
    let items = engine.desired_items()?;

    if !json {
        println!(
            "{} Synchronizing {} item(s) into {}...",
            "=>".blue().bold(),
            items.len(),
            engine.target_dir().as_str().cyan()
        );
    }

    let report = engine.run(&items, SyncOptions { dry_run })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(result) = &report.result {
        print_result(result);
    } else {
        println!("{} Dry run, nothing was changed:", "[dry-run]".yellow());
        print_plan(&report.plan);
    }

    match &report.result {
        Some(result) if result.has_errors() => Err(CliError::Incomplete {
            count: result.errors.len(),
        }),
        _ => Ok(()),
    }
}

fn print_result(result: &SyncResult) {
    if result.created_count == 0
        && result.removed_count == 0
        && result.skipped.is_empty()
        && !result.has_errors()
    {
        println!("{} Already synchronized. No changes needed.", "OK".green().bold());
        return;
    }

    for skipped in &result.skipped {
        println!(
            "   {} {} ({}): {}",
            "~".yellow(),
            skipped.item.name.cyan(),
            skipped.item.id.dimmed(),
            skipped.reason
        );
    }

    for failure in &result.errors {
        let subject = match (&failure.item, &failure.path) {
            (Some(item), _) => format!("{} ({})", item.name, item.id),
            (None, Some(path)) => path.to_string(),
            (None, None) => String::from("?"),
        };
        let label = match failure.kind {
            FailureKind::PermissionDenied => "permission denied".red().bold(),
            FailureKind::OperationFailed => "failed".red(),
        };
        println!("   {} {} {}: {}", "!".red(), subject.cyan(), label, failure.message);
    }

    let status = if result.has_errors() {
        "DONE WITH ERRORS".red().bold()
    } else {
        "OK".green().bold()
    };
    println!(
        "{} {} created, {} removed, {} skipped, {} error(s)",
        status,
        result.created_count,
        result.removed_count,
        result.skipped_count,
        result.errors.len()
    );

    if result.has_permission_errors() {
        println!();
        println!(
            "{} Creating links needs extra rights on some systems. Run the command \
             from an elevated shell, enable Developer Mode on Windows, or check the \
             permissions of the target directory.",
            "hint:".yellow().bold()
        );
    }
}
