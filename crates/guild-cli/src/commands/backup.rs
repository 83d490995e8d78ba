//! Backup command implementation

use std::path::Path;

use colored::Colorize;

use guild_config::{export_backup, load_snapshot};

use crate::error::Result;

/// Export a snapshot file as a timestamped configuration backup
pub fn run_backup(snapshot_path: &Path, out: &Path) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let dir = export_backup(out, &snapshot)?;
    println!(
        "{} Backup written to {}",
        "OK".green().bold(),
        dir.display()
    );
    Ok(())
}
