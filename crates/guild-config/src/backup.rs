//! Backup export
//!
//! Exports the observed remote state as a timestamped set of
//! configuration-shaped YAML files, so a backup can be dropped straight
//! back in as a configuration directory. The built-in `@everyone` role
//! is skipped: it cannot be created, so it has no place in config.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use guild_model::{
    CategorySpec, ChannelSpec, DesiredState, EVERYONE, IntegrationSpec, RemoteStateSnapshot,
    RoleSpec,
};

use crate::error::{ConfigError, Result};
use crate::loader::{CHANNELS_FILE, INTEGRATIONS_FILE, ROLES_FILE};

const METADATA_FILE: &str = "metadata.yaml";

/// When and from what a backup was taken
#[derive(Debug, Clone, Serialize)]
struct BackupMetadata {
    created: DateTime<Utc>,
    roles: usize,
    categories: usize,
    integrations: usize,
}

#[derive(Serialize)]
struct RolesFile<'a> {
    roles: &'a [RoleSpec],
}

#[derive(Serialize)]
struct ChannelsFile<'a> {
    categories: &'a [CategorySpec],
}

#[derive(Serialize)]
struct IntegrationsFile<'a> {
    integrations: &'a [IntegrationSpec],
}

/// Strip remote IDs from a snapshot, yielding config-shaped state
///
/// Forum tags are not observable remotely, so exported channels carry
/// none. Integrations export as enabled with an empty event list;
/// events are configuration-only.
pub fn desired_from_snapshot(snapshot: &RemoteStateSnapshot) -> DesiredState {
    DesiredState {
        roles: snapshot
            .roles
            .iter()
            .filter(|role| role.name != EVERYONE)
            .map(|role| RoleSpec {
                name: role.name.clone(),
                color: role.color,
                permissions: role.permissions.clone(),
                hoist: role.hoist,
                mentionable: role.mentionable,
            })
            .collect(),
        categories: snapshot
            .categories
            .iter()
            .map(|category| CategorySpec {
                name: category.name.clone(),
                position: category.position,
                channels: category
                    .channels
                    .iter()
                    .map(|channel| ChannelSpec {
                        name: channel.name.clone(),
                        kind: channel.kind,
                        topic: channel.topic.clone(),
                        position: channel.position,
                        overwrites: channel.overwrites.clone(),
                        tags: Vec::new(),
                    })
                    .collect(),
            })
            .collect(),
        integrations: snapshot
            .integrations
            .iter()
            .map(|integration| IntegrationSpec {
                kind: integration.kind.clone(),
                enabled: true,
                channel: integration.channel.clone(),
                events: Vec::new(),
            })
            .collect(),
    }
}

/// Export a snapshot into `root/<timestamp>/` and return that directory
pub fn export_backup(root: &Path, snapshot: &RemoteStateSnapshot) -> Result<PathBuf> {
    export_backup_at(root, snapshot, Utc::now())
}

fn export_backup_at(
    root: &Path,
    snapshot: &RemoteStateSnapshot,
    created: DateTime<Utc>,
) -> Result<PathBuf> {
    let dir = root.join(created.format("%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
        path: dir.clone(),
        source,
    })?;

    let desired = desired_from_snapshot(snapshot);
    write_yaml(
        &dir.join(ROLES_FILE),
        "roles",
        &RolesFile {
            roles: &desired.roles,
        },
    )?;
    write_yaml(
        &dir.join(CHANNELS_FILE),
        "categories",
        &ChannelsFile {
            categories: &desired.categories,
        },
    )?;
    write_yaml(
        &dir.join(INTEGRATIONS_FILE),
        "integrations",
        &IntegrationsFile {
            integrations: &desired.integrations,
        },
    )?;
    write_yaml(
        &dir.join(METADATA_FILE),
        "backup metadata",
        &BackupMetadata {
            created,
            roles: desired.roles.len(),
            categories: desired.categories.len(),
            integrations: desired.integrations.len(),
        },
    )?;

    info!(dir = %dir.display(), "exported backup");
    Ok(dir)
}

fn write_yaml<T: Serialize>(path: &Path, what: &str, value: &T) -> Result<()> {
    let content = serde_yaml::to_string(value).map_err(|source| ConfigError::Serialize {
        what: what.to_string(),
        source,
    })?;
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
