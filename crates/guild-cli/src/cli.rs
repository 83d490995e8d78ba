//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Guild Manager - Reconcile a collaboration server against declarative config
#[derive(Parser, Debug)]
#[command(name = "guildctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate a configuration directory without touching anything
    Validate {
        /// Configuration directory
        #[arg(short, long, default_value = "config")]
        config: PathBuf,
    },

    /// Preview what apply would change
    ///
    /// Diffs the configuration against a snapshot file and prints the
    /// ordered mutation plan, plus any advisory deletions and kind
    /// conflicts. Without --snapshot the server is assumed empty, which
    /// previews a fresh setup.
    Plan {
        /// Configuration directory
        #[arg(short, long, default_value = "config")]
        config: PathBuf,

        /// Snapshot file describing current server state
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Apply the configuration to a simulated server
    ///
    /// Seeds an in-memory server from the snapshot (empty without one),
    /// executes the plan against it, and reports per-operation results.
    Apply {
        /// Configuration directory
        #[arg(short, long, default_value = "config")]
        config: PathBuf,

        /// Snapshot file describing current server state
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Record what would happen without mutating anything
        #[arg(long)]
        dry_run: bool,

        /// Maximum operations in flight at once
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Write the post-apply server state to this snapshot file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Export a snapshot as a timestamped configuration backup
    Backup {
        /// Snapshot file to export
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Directory that receives the timestamped backup
        #[arg(short, long, default_value = "backups")]
        out: PathBuf,
    },
}
