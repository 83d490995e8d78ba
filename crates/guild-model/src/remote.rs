//! Observed remote-state models
//!
//! A [`RemoteStateSnapshot`] mirrors the desired-state shape with one
//! addition: every resource carries the opaque [`RemoteId`] the service
//! assigned to it. The snapshot is fetched once per invocation and shared
//! read-only across diff and plan computation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::desired::{ChannelKind, Color};
use crate::permissions::{PermissionOverwrite, PermissionSet};

/// An opaque resource identifier assigned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A role as currently deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRole {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub hoist: bool,
    #[serde(default)]
    pub mentionable: bool,
}

/// A channel as currently deployed, including its permission overwrites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChannel {
    pub id: RemoteId,
    pub name: String,
    pub kind: ChannelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub position: i32,
    /// Overwrites keyed by role name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overwrites: BTreeMap<String, PermissionOverwrite>,
}

/// A category as currently deployed, owning its channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCategory {
    pub id: RemoteId,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<RemoteChannel>,
}

/// A webhook integration as currently deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIntegration {
    pub id: RemoteId,
    pub kind: String,
    /// Name of the channel the webhook posts into
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The live, observed shape of server resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStateSnapshot {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RemoteRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<RemoteCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<RemoteIntegration>,
}

impl RemoteStateSnapshot {
    /// Look up a role by name
    pub fn role(&self, name: &str) -> Option<&RemoteRole> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&RemoteCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Look up a channel by `(category, name)`
    pub fn channel(&self, category: &str, name: &str) -> Option<&RemoteChannel> {
        self.category(category)?.channels.iter().find(|c| c.name == name)
    }

    /// Find a channel by bare name across all categories
    ///
    /// Integration targets are configured by channel name alone; the
    /// first match in category order wins.
    pub fn find_channel(&self, name: &str) -> Option<(&RemoteCategory, &RemoteChannel)> {
        self.categories.iter().find_map(|category| {
            category
                .channels
                .iter()
                .find(|c| c.name == name)
                .map(|c| (category, c))
        })
    }

    /// Look up an integration by kind
    pub fn integration(&self, kind: &str) -> Option<&RemoteIntegration> {
        self.integrations.iter().find(|i| i.kind == kind)
    }
}
