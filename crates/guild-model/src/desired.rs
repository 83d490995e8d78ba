//! Desired-state models
//!
//! An immutable snapshot of configuration intent: roles, the category and
//! channel tree, and webhook integrations. Constructed once per invocation
//! by the configuration loader and read-only thereafter.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::permissions::{PermissionOverwrite, PermissionSet};

/// A role color, stored as a 24-bit RGB value
///
/// Serialized as a `#rrggbb` hex string, the format used in config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    /// Parse a `#rrggbb` hex string
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 {
            return Err(invalid());
        }
        let rgb = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        Ok(Self(rgb))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// The kind of a channel
///
/// Kind is immutable on the remote service: a desired kind that differs
/// from the remote kind is a conflict, never an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
    Forum,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Text => f.write_str("text"),
            ChannelKind::Voice => f.write_str("voice"),
            ChannelKind::Forum => f.write_str("forum"),
        }
    }
}

/// A selectable tag on a forum channel
///
/// Tags are create-only: they ride along in channel create payloads and
/// are not reconciled on existing channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Desired shape of a role, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
}

/// Desired shape of a channel, unique by name within its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: i32,
    /// Per-role permission overwrites, keyed by role name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overwrites: BTreeMap<String, PermissionOverwrite>,
    /// Forum tags, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagSpec>,
}

/// Desired shape of a category and the channels it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelSpec>,
}

/// A webhook integration, single-valued per kind (e.g. "github")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSpec {
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
    /// Name of the channel the webhook posts into
    pub channel: String,
    /// Event names forwarded by the integration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// The configuration-derived target shape of server resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategorySpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<IntegrationSpec>,
}

impl DesiredState {
    /// Check the state invariants
    ///
    /// Names are the sole identity key, so they must be unique within
    /// their scope: roles and categories globally, channels within their
    /// category, integrations by kind. Overwrites must not allow and deny
    /// the same permission. The first violation found is returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut role_names = BTreeSet::new();
        for role in &self.roles {
            if !role_names.insert(role.name.as_str()) {
                return Err(ValidationError::DuplicateRole {
                    name: role.name.clone(),
                });
            }
        }

        let mut category_names = BTreeSet::new();
        for category in &self.categories {
            if !category_names.insert(category.name.as_str()) {
                return Err(ValidationError::DuplicateCategory {
                    name: category.name.clone(),
                });
            }

            let mut channel_names = BTreeSet::new();
            for channel in &category.channels {
                if !channel_names.insert(channel.name.as_str()) {
                    return Err(ValidationError::DuplicateChannel {
                        category: category.name.clone(),
                        name: channel.name.clone(),
                    });
                }

                for (role, overwrite) in &channel.overwrites {
                    if let Some(permission) = overwrite.conflicts().first() {
                        return Err(ValidationError::ConflictingPermission {
                            channel: channel.name.clone(),
                            role: role.clone(),
                            permission: *permission,
                        });
                    }
                }
            }
        }

        let mut kinds = BTreeSet::new();
        for integration in &self.integrations {
            if !kinds.insert(integration.kind.as_str()) {
                return Err(ValidationError::DuplicateIntegration {
                    kind: integration.kind.clone(),
                });
            }
        }

        Ok(())
    }

    /// Names of all roles managed by this configuration
    pub fn role_names(&self) -> BTreeSet<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// Look up a role spec by name
    pub fn role(&self, name: &str) -> Option<&RoleSpec> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Look up a category spec by name
    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.name == name)
    }
}
