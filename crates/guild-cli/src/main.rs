//! Guild Manager CLI
//!
//! The command-line interface for reconciling a collaboration server
//! against declarative configuration.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::ApplyArgs;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Guild Manager CLI", "guildctl".green().bold());
            println!();
            println!("Run {} for available commands.", "guildctl --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Validate { config } => commands::run_validate(&config),
        Commands::Plan {
            config,
            snapshot,
            json,
        } => commands::run_plan(&config, snapshot.as_deref(), json),
        Commands::Apply {
            config,
            snapshot,
            dry_run,
            concurrency,
            out,
            json,
        } => commands::run_apply(&ApplyArgs {
            config_dir: &config,
            snapshot: snapshot.as_deref(),
            dry_run,
            concurrency,
            out: out.as_deref(),
            json,
        }),
        Commands::Backup { snapshot, out } => commands::run_backup(&snapshot, &out),
    }
}
