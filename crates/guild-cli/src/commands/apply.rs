//! Apply command implementation
//!
//! Runs the full pipeline against an in-memory server seeded from a
//! snapshot file. Live transports are out of scope; the simulated apply
//! exercises exactly the same plan and executor a live one would.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde_json::json;

use guild_client::{RemoteClient, fetch_snapshot, memory::InMemoryGuild};
use guild_config::{GuildConfig, save_snapshot};
use guild_engine::{ExecuteOptions, ExecutionReport, Executor, Outcome};

use crate::error::{CliError, Result};

use super::load_remote;
use super::plan::print_outcome;

pub struct ApplyArgs<'a> {
    pub config_dir: &'a Path,
    pub snapshot: Option<&'a Path>,
    pub dry_run: bool,
    pub concurrency: usize,
    pub out: Option<&'a Path>,
    pub json: bool,
}

/// Plan and execute against a simulated server
pub fn run_apply(args: &ApplyArgs<'_>) -> Result<()> {
    let config = GuildConfig::load(args.config_dir)?;
    let guild = Arc::new(InMemoryGuild::seeded(load_remote(args.snapshot)?));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let (outcome, report) = runtime.block_on(async {
        let remote = fetch_snapshot(guild.as_ref())
            .await
            .map_err(|e| CliError::user(format!("failed to fetch server state: {e}")))?;
        let outcome = guild_engine::plan(&config.desired, &remote)?;

        let executor = Executor::new(Arc::clone(&guild) as Arc<dyn RemoteClient>);
        let options = ExecuteOptions {
            dry_run: args.dry_run,
            concurrency: args.concurrency,
            ..Default::default()
        };
        let report = executor.execute(&outcome.plan, &options).await;
        Ok::<_, CliError>((outcome, report))
    })?;

    if args.json {
        let output = json!({
            "advisory_deletions": outcome.advisory_deletions,
            "kind_conflicts": outcome.kind_conflicts,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_outcome(&outcome);
        print_report(&report);
    }

    if let Some(out) = args.out {
        save_snapshot(out, &guild.snapshot())?;
        if !args.json {
            println!("{} Snapshot written to {}", "OK".green().bold(), out.display());
        }
    }

    if report.failed() > 0 {
        return Err(CliError::user(format!(
            "{} operation(s) failed",
            report.failed()
        )));
    }
    Ok(())
}

fn print_report(report: &ExecutionReport) {
    if report.results.is_empty() {
        return;
    }

    println!();
    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!(
        "{} Applied {}, skipped {}, failed {}{mode}",
        "=>".blue().bold(),
        report.applied(),
        report.skipped(),
        report.failed()
    );
    for result in &report.results {
        match &result.outcome {
            Outcome::Applied { url: Some(url), .. } => {
                println!("   {} {} -> {}", "+".green(), result.id.as_str().cyan(), url);
            }
            Outcome::Applied { .. } => {
                println!("   {} {}", "+".green(), result.id.as_str().cyan());
            }
            Outcome::Skipped { reason } => {
                println!(
                    "   {} {} ({reason})",
                    "~".yellow(),
                    result.id.as_str().cyan()
                );
            }
            Outcome::Failed { error, attempts } => {
                println!(
                    "   {} {} after {} attempt(s): {error}",
                    "!".red(),
                    result.id.as_str().cyan(),
                    attempts
                );
            }
        }
    }
}
