//! Command implementations

mod apply;
mod backup;
mod plan;
mod validate;

pub use apply::{ApplyArgs, run_apply};
pub use backup::run_backup;
pub use plan::run_plan;
pub use validate::run_validate;

use std::path::Path;

use guild_client::memory::InMemoryGuild;
use guild_config::load_snapshot;
use guild_model::RemoteStateSnapshot;

use crate::error::Result;

/// Load the snapshot file, or assume a fresh server without one
///
/// A fresh server is not empty: it carries the built-in `@everyone`
/// role, so configurations that overwrite it still plan cleanly.
pub(crate) fn load_remote(snapshot: Option<&Path>) -> Result<RemoteStateSnapshot> {
    match snapshot {
        Some(path) => Ok(load_snapshot(path)?),
        None => Ok(InMemoryGuild::new().snapshot()),
    }
}
