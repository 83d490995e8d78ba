//! Snapshot files
//!
//! A [`RemoteStateSnapshot`] can be written to and read back from a
//! single YAML file. The CLI uses snapshot files as its stand-in for a
//! live service: `plan` diffs against one, `apply` seeds its simulated
//! server from one.

use std::fs;
use std::path::Path;

use tracing::debug;

use guild_model::RemoteStateSnapshot;

use crate::error::{ConfigError, Result};
use crate::loader::read_yaml;

/// Read a snapshot from a YAML file
pub fn load_snapshot(path: &Path) -> Result<RemoteStateSnapshot> {
    let snapshot = read_yaml(path)?;
    debug!(path = %path.display(), "loaded snapshot");
    Ok(snapshot)
}

/// Write a snapshot to a YAML file, replacing any existing content
pub fn save_snapshot(path: &Path, snapshot: &RemoteStateSnapshot) -> Result<()> {
    let content =
        serde_yaml::to_string(snapshot).map_err(|source| ConfigError::Serialize {
            what: "snapshot".to_string(),
            source,
        })?;
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "saved snapshot");
    Ok(())
}
