//! Library Mirror CLI
//!
//! Maintains a directory of links (or copies) that mirrors a filtered view
//! of a media library.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    execute_command(&cli.profile, cli.command)
}

fn execute_command(profile: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            library,
            target,
            mode,
            link_type,
            tags,
            extensions,
            force,
        } => commands::run_init(
            profile,
            &commands::InitArgs {
                library,
                target,
                mode,
                link_type,
                tags,
                extensions,
                force,
            },
        ),
        Commands::Plan { json } => commands::run_plan(profile, json),
        Commands::Sync { dry_run, json } => commands::run_sync(profile, dry_run, json),
        Commands::Check { json } => commands::run_check(profile, json),
        Commands::Status => commands::run_status(profile),
    }
}
