//! Permission names and per-channel permission overwrites

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named permission on the remote service
///
/// Serialized in snake_case, matching the names used in configuration
/// files (e.g. `send_messages`, `read_message_history`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Administrator,
    ViewChannel,
    SendMessages,
    EmbedLinks,
    AttachFiles,
    ReadMessageHistory,
    UseExternalEmojis,
    AddReactions,
    ManageMessages,
    ManageChannels,
    ManageWebhooks,
    CreatePublicThreads,
    Connect,
    Speak,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the serde snake_case name so logs match config files
        let name = match self {
            Permission::Administrator => "administrator",
            Permission::ViewChannel => "view_channel",
            Permission::SendMessages => "send_messages",
            Permission::EmbedLinks => "embed_links",
            Permission::AttachFiles => "attach_files",
            Permission::ReadMessageHistory => "read_message_history",
            Permission::UseExternalEmojis => "use_external_emojis",
            Permission::AddReactions => "add_reactions",
            Permission::ManageMessages => "manage_messages",
            Permission::ManageChannels => "manage_channels",
            Permission::ManageWebhooks => "manage_webhooks",
            Permission::CreatePublicThreads => "create_public_threads",
            Permission::Connect => "connect",
            Permission::Speak => "speak",
        };
        f.write_str(name)
    }
}

/// An ordered set of permissions
pub type PermissionSet = BTreeSet<Permission>;

/// A per-channel, per-role allow/deny exception layered over role defaults
///
/// A permission present in neither set is inherited from the role level.
/// `allow` and `deny` must be disjoint; [`PermissionOverwrite::conflicts`]
/// reports any overlap and [`crate::DesiredState::validate`] rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Permissions explicitly granted on this channel
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub allow: PermissionSet,
    /// Permissions explicitly denied on this channel
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deny: PermissionSet,
}

impl PermissionOverwrite {
    /// Build an overwrite from allow and deny lists
    pub fn new(
        allow: impl IntoIterator<Item = Permission>,
        deny: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            allow: allow.into_iter().collect(),
            deny: deny.into_iter().collect(),
        }
    }

    /// Permissions present in both the allow and the deny set
    pub fn conflicts(&self) -> Vec<Permission> {
        self.allow.intersection(&self.deny).copied().collect()
    }

    /// True when the overwrite neither allows nor denies anything
    pub fn is_neutral(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}
