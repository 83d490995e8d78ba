//! Plan command implementation

use std::path::Path;

use colored::Colorize;

use guild_config::GuildConfig;
use guild_engine::PlanOutcome;

use crate::error::Result;

use super::load_remote;

/// Diff configuration against a snapshot and print the plan
pub fn run_plan(config_dir: &Path, snapshot: Option<&Path>, json: bool) -> Result<()> {
    let config = GuildConfig::load(config_dir)?;
    let remote = load_remote(snapshot)?;
    let outcome = guild_engine::plan(&config.desired, &remote)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_outcome(&outcome);
    Ok(())
}

pub(crate) fn print_outcome(outcome: &PlanOutcome) {
    if outcome.is_noop() {
        println!(
            "{} Server matches configuration. Nothing to do.",
            "OK".green().bold()
        );
        return;
    }

    if !outcome.plan.is_empty() {
        println!(
            "{} {} operation(s) planned:",
            "=>".blue().bold(),
            outcome.plan.len()
        );
        for op in &outcome.plan.operations {
            println!("   {} {} ({})", "+".green(), op.id.as_str().cyan(), op.payload.kind());
        }
    }

    if !outcome.kind_conflicts.is_empty() {
        println!();
        println!(
            "{} {} channel(s) frozen by kind conflicts:",
            "CONFLICT".red().bold(),
            outcome.kind_conflicts.len()
        );
        for conflict in &outcome.kind_conflicts {
            println!(
                "   {} {}/{}: configured as {}, exists as {}",
                "!".red(),
                conflict.category.cyan(),
                conflict.channel.cyan(),
                conflict.desired,
                conflict.remote
            );
        }
    }

    if !outcome.advisory_deletions.is_empty() {
        println!();
        println!(
            "{} {} unmanaged resource(s) left untouched:",
            "ADVISORY".yellow().bold(),
            outcome.advisory_deletions.len()
        );
        for deletion in &outcome.advisory_deletions {
            println!(
                "   {} {} {} ({})",
                "-".yellow(),
                deletion.kind,
                deletion.name.cyan(),
                deletion.id.as_str().dimmed()
            );
        }
        println!();
        println!("Delete these manually if removal is intended.");
    }
}
