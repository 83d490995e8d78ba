//! Field-level change sets
//!
//! Update payloads carry only the fields that actually differ, so the
//! executor can issue minimal mutation calls against the remote API.

use serde::{Deserialize, Serialize};

use crate::desired::Color;
use crate::permissions::PermissionSet;

/// Changed fields of a role; `None` means the field is already in sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentionable: Option<bool>,
}

impl RoleChanges {
    /// True when no field differs
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.permissions.is_none()
            && self.hoist.is_none()
            && self.mentionable.is_none()
    }
}

/// Changed fields of a channel; kind is immutable and never appears here
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl ChannelChanges {
    /// True when no field differs
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.position.is_none()
    }
}
