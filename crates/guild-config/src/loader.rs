//! Configuration directory loading
//!
//! Desired state is split across a handful of YAML files in one
//! directory. Every file is optional; a missing file contributes
//! nothing, so a directory containing only `roles.yaml` is a valid
//! (roles-only) configuration. The assembled state is validated before
//! it is returned.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use guild_model::{CategorySpec, DesiredState, IntegrationSpec, RoleSpec};

use crate::error::{ConfigError, Result};

pub const SERVER_FILE: &str = "server.yaml";
pub const ROLES_FILE: &str = "roles.yaml";
pub const CHANNELS_FILE: &str = "channels.yaml";
pub const INTEGRATIONS_FILE: &str = "integrations.yaml";

/// Server-level settings from `server.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RolesFile {
    #[serde(default)]
    roles: Vec<RoleSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelsFile {
    #[serde(default)]
    categories: Vec<CategorySpec>,
}

#[derive(Debug, Default, Deserialize)]
struct IntegrationsFile {
    #[serde(default)]
    integrations: Vec<IntegrationSpec>,
}

/// A fully loaded and validated configuration directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildConfig {
    /// Present when `server.yaml` exists
    pub profile: Option<ServerProfile>,
    pub desired: DesiredState,
}

impl GuildConfig {
    /// Load and validate a configuration directory
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ConfigError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let profile: Option<ServerProfile> = read_optional(&dir.join(SERVER_FILE))?;
        let roles: RolesFile = read_optional(&dir.join(ROLES_FILE))?.unwrap_or_default();
        let channels: ChannelsFile = read_optional(&dir.join(CHANNELS_FILE))?.unwrap_or_default();
        let integrations: IntegrationsFile =
            read_optional(&dir.join(INTEGRATIONS_FILE))?.unwrap_or_default();

        let desired = DesiredState {
            roles: roles.roles,
            categories: channels.categories,
            integrations: integrations.integrations,
        };
        desired.validate()?;

        debug!(
            dir = %dir.display(),
            roles = desired.roles.len(),
            categories = desired.categories.len(),
            integrations = desired.integrations.len(),
            "loaded configuration"
        );
        Ok(Self { profile, desired })
    }
}

pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if path.exists() {
        read_yaml(path).map(Some)
    } else {
        Ok(None)
    }
}
