//! Configuration layer for Guild Manager
//!
//! Loads desired state from a directory of YAML files, reads and writes
//! snapshot files, and exports timestamped backups of observed state.

mod backup;
mod error;
mod loader;
mod snapshot;

pub use backup::{desired_from_snapshot, export_backup};
pub use error::{ConfigError, Result};
pub use loader::{
    CHANNELS_FILE, GuildConfig, INTEGRATIONS_FILE, ROLES_FILE, SERVER_FILE, ServerProfile,
};
pub use snapshot::{load_snapshot, save_snapshot};
