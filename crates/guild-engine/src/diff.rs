//! Pure state comparison
//!
//! [`diff`] compares a validated [`DesiredState`] against a
//! [`RemoteStateSnapshot`] and produces a [`ResourceDelta`]: per resource
//! family, what to create, what to update, and what exists remotely
//! without a configuration counterpart. The delta is data only; it is
//! turned into ordered operations by [`crate::plan::build_plan`].
//!
//! Deletions are advisory. The engine never schedules a destructive
//! operation: unmanaged remote resources are reported and left alone.

use serde::Serialize;
use tracing::debug;

use guild_model::{
    ChannelChanges, ChannelKind, ChannelSpec, DesiredState, EVERYONE, IntegrationSpec,
    PermissionOverwrite, RemoteChannel, RemoteId, RemoteRole, RemoteStateSnapshot, RoleChanges,
    RoleSpec,
};

use crate::error::Result;

/// The resource families the engine reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Role,
    Category,
    Channel,
    Overwrite,
    Integration,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Role => "role",
            ResourceKind::Category => "category",
            ResourceKind::Channel => "channel",
            ResourceKind::Overwrite => "overwrite",
            ResourceKind::Integration => "integration",
        };
        f.write_str(name)
    }
}

/// A remote resource with no desired counterpart
///
/// Surfaced to the operator for manual action; never executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryDeletion {
    pub kind: ResourceKind,
    /// Human-readable path of the resource, e.g. `Info/general` for a
    /// channel or `Info/general:Mod` for an overwrite
    pub name: String,
    pub id: RemoteId,
}

/// A channel whose desired kind differs from its immutable remote kind
///
/// No update is generated for a conflicted channel; the operator must
/// recreate it by hand (or change the configuration) before the engine
/// will touch it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindConflict {
    pub category: String,
    pub channel: String,
    pub desired: ChannelKind,
    pub remote: ChannelKind,
}

/// An existing role whose fields drifted from the desired spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleUpdate {
    pub name: String,
    pub id: RemoteId,
    pub changes: RoleChanges,
}

/// Role creations, updates, and advisory deletions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleDelta {
    pub to_create: Vec<RoleSpec>,
    pub to_update: Vec<RoleUpdate>,
    pub to_delete: Vec<AdvisoryDeletion>,
}

/// A category missing from the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCreate {
    pub name: String,
    pub position: i32,
}

/// Category creations and advisory deletions
///
/// Matched categories are considered in sync: name is the identity key
/// and no other category field is reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDelta {
    pub to_create: Vec<CategoryCreate>,
    pub to_delete: Vec<AdvisoryDeletion>,
}

/// A channel missing from the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCreate {
    pub category: String,
    pub spec: ChannelSpec,
}

/// An existing channel whose mutable fields drifted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelUpdate {
    pub category: String,
    pub name: String,
    pub id: RemoteId,
    pub changes: ChannelChanges,
}

/// Channel creations, updates, and advisory deletions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelDelta {
    pub to_create: Vec<ChannelCreate>,
    pub to_update: Vec<ChannelUpdate>,
    pub to_delete: Vec<AdvisoryDeletion>,
}

/// An overwrite to set on one channel for one role
///
/// Setting replaces the whole overwrite, so creations and updates carry
/// the same payload; they are kept apart for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverwriteSet {
    pub category: String,
    pub channel: String,
    pub role: String,
    pub overwrite: PermissionOverwrite,
}

/// Overwrite sets and advisory deletions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverwriteDelta {
    pub to_create: Vec<OverwriteSet>,
    pub to_update: Vec<OverwriteSet>,
    pub to_delete: Vec<AdvisoryDeletion>,
}

/// Integration creations and advisory deletions
///
/// Integrations are create-only on the remote side: retargeting one to a
/// different channel shows up as an advisory deletion of the old webhook
/// plus a creation of the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationDelta {
    pub to_create: Vec<IntegrationSpec>,
    pub to_delete: Vec<AdvisoryDeletion>,
}

/// Everything that differs between desired and remote state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceDelta {
    pub roles: RoleDelta,
    pub categories: CategoryDelta,
    pub channels: ChannelDelta,
    pub overwrites: OverwriteDelta,
    pub integrations: IntegrationDelta,
    pub kind_conflicts: Vec<KindConflict>,
}

impl ResourceDelta {
    /// True when no create or update is pending
    ///
    /// Advisory deletions and kind conflicts do not count: they produce
    /// no operations, so a delta containing only those is still in sync.
    pub fn is_empty(&self) -> bool {
        self.roles.to_create.is_empty()
            && self.roles.to_update.is_empty()
            && self.categories.to_create.is_empty()
            && self.channels.to_create.is_empty()
            && self.channels.to_update.is_empty()
            && self.overwrites.to_create.is_empty()
            && self.overwrites.to_update.is_empty()
            && self.integrations.to_create.is_empty()
    }

    /// All advisory deletions across resource families, in report order
    pub fn advisory_deletions(&self) -> Vec<AdvisoryDeletion> {
        let mut all = Vec::new();
        all.extend(self.roles.to_delete.iter().cloned());
        all.extend(self.categories.to_delete.iter().cloned());
        all.extend(self.channels.to_delete.iter().cloned());
        all.extend(self.overwrites.to_delete.iter().cloned());
        all.extend(self.integrations.to_delete.iter().cloned());
        all
    }
}

/// Compare desired configuration against the observed remote state
///
/// Validates the desired state first, then matches every resource by
/// name within its scope. Pure: neither input is mutated and no remote
/// call is made.
pub fn diff(desired: &DesiredState, remote: &RemoteStateSnapshot) -> Result<ResourceDelta> {
    desired.validate()?;

    let mut delta = ResourceDelta::default();
    diff_roles(desired, remote, &mut delta);
    diff_categories(desired, remote, &mut delta);
    diff_integrations(desired, remote, &mut delta);

    debug!(
        role_creates = delta.roles.to_create.len(),
        role_updates = delta.roles.to_update.len(),
        category_creates = delta.categories.to_create.len(),
        channel_creates = delta.channels.to_create.len(),
        channel_updates = delta.channels.to_update.len(),
        overwrite_sets = delta.overwrites.to_create.len() + delta.overwrites.to_update.len(),
        integration_creates = delta.integrations.to_create.len(),
        advisory_deletions = delta.advisory_deletions().len(),
        kind_conflicts = delta.kind_conflicts.len(),
        "computed resource delta"
    );

    Ok(delta)
}

fn diff_roles(desired: &DesiredState, remote: &RemoteStateSnapshot, delta: &mut ResourceDelta) {
    for spec in &desired.roles {
        match remote.role(&spec.name) {
            None => delta.roles.to_create.push(spec.clone()),
            Some(existing) => {
                let changes = role_changes(spec, existing);
                if !changes.is_empty() {
                    delta.roles.to_update.push(RoleUpdate {
                        name: spec.name.clone(),
                        id: existing.id.clone(),
                        changes,
                    });
                }
            }
        }
    }

    let managed = desired.role_names();
    for role in &remote.roles {
        if role.name != EVERYONE && !managed.contains(role.name.as_str()) {
            delta.roles.to_delete.push(AdvisoryDeletion {
                kind: ResourceKind::Role,
                name: role.name.clone(),
                id: role.id.clone(),
            });
        }
    }
}

fn role_changes(spec: &RoleSpec, remote: &RemoteRole) -> RoleChanges {
    RoleChanges {
        color: (spec.color != remote.color).then_some(spec.color),
        permissions: (spec.permissions != remote.permissions)
            .then(|| spec.permissions.clone()),
        hoist: (spec.hoist != remote.hoist).then_some(spec.hoist),
        mentionable: (spec.mentionable != remote.mentionable).then_some(spec.mentionable),
    }
}

fn diff_categories(
    desired: &DesiredState,
    remote: &RemoteStateSnapshot,
    delta: &mut ResourceDelta,
) {
    let managed_roles = desired.role_names();
    for category in &desired.categories {
        match remote.category(&category.name) {
            None => {
                delta.categories.to_create.push(CategoryCreate {
                    name: category.name.clone(),
                    position: category.position,
                });
                // A fresh category has no remote channels to compare against.
                for channel in &category.channels {
                    delta.channels.to_create.push(ChannelCreate {
                        category: category.name.clone(),
                        spec: channel.clone(),
                    });
                    overwrite_creates(&category.name, channel, delta);
                }
            }
            Some(existing) => {
                for channel in &category.channels {
                    diff_channel(
                        &category.name,
                        channel,
                        existing.channels.as_slice(),
                        &managed_roles,
                        delta,
                    );
                }

                let managed: std::collections::BTreeSet<&str> =
                    category.channels.iter().map(|c| c.name.as_str()).collect();
                for channel in &existing.channels {
                    if !managed.contains(channel.name.as_str()) {
                        delta.channels.to_delete.push(AdvisoryDeletion {
                            kind: ResourceKind::Channel,
                            name: format!("{}/{}", category.name, channel.name),
                            id: channel.id.clone(),
                        });
                    }
                }
            }
        }
    }

    let managed: std::collections::BTreeSet<&str> =
        desired.categories.iter().map(|c| c.name.as_str()).collect();
    for category in &remote.categories {
        if !managed.contains(category.name.as_str()) {
            delta.categories.to_delete.push(AdvisoryDeletion {
                kind: ResourceKind::Category,
                name: category.name.clone(),
                id: category.id.clone(),
            });
        }
    }
}

fn diff_channel(
    category: &str,
    spec: &ChannelSpec,
    remote_channels: &[RemoteChannel],
    managed_roles: &std::collections::BTreeSet<&str>,
    delta: &mut ResourceDelta,
) {
    let Some(existing) = remote_channels.iter().find(|c| c.name == spec.name) else {
        delta.channels.to_create.push(ChannelCreate {
            category: category.to_string(),
            spec: spec.clone(),
        });
        overwrite_creates(category, spec, delta);
        return;
    };

    if existing.kind != spec.kind {
        // Kind is immutable remotely; the whole channel is frozen until
        // the operator resolves the conflict.
        delta.kind_conflicts.push(KindConflict {
            category: category.to_string(),
            channel: spec.name.clone(),
            desired: spec.kind,
            remote: existing.kind,
        });
        return;
    }

    // An absent desired topic means "unmanaged", never "clear it".
    let topic_drifted = spec.topic.is_some() && spec.topic != existing.topic;
    let changes = ChannelChanges {
        topic: topic_drifted.then(|| spec.topic.clone()).flatten(),
        position: (spec.position != existing.position).then_some(spec.position),
    };
    if !changes.is_empty() {
        delta.channels.to_update.push(ChannelUpdate {
            category: category.to_string(),
            name: spec.name.clone(),
            id: existing.id.clone(),
            changes,
        });
    }

    for (role, overwrite) in &spec.overwrites {
        let set = OverwriteSet {
            category: category.to_string(),
            channel: spec.name.clone(),
            role: role.clone(),
            overwrite: overwrite.clone(),
        };
        match existing.overwrites.get(role) {
            None => delta.overwrites.to_create.push(set),
            Some(current) if current != overwrite => delta.overwrites.to_update.push(set),
            Some(_) => {}
        }
    }

    for role in existing.overwrites.keys() {
        if !spec.overwrites.contains_key(role) && managed_roles.contains(role.as_str()) {
            delta.overwrites.to_delete.push(AdvisoryDeletion {
                kind: ResourceKind::Overwrite,
                name: format!("{category}/{}:{role}", spec.name),
                id: existing.id.clone(),
            });
        }
    }
}

fn overwrite_creates(category: &str, spec: &ChannelSpec, delta: &mut ResourceDelta) {
    for (role, overwrite) in &spec.overwrites {
        delta.overwrites.to_create.push(OverwriteSet {
            category: category.to_string(),
            channel: spec.name.clone(),
            role: role.clone(),
            overwrite: overwrite.clone(),
        });
    }
}

fn diff_integrations(
    desired: &DesiredState,
    remote: &RemoteStateSnapshot,
    delta: &mut ResourceDelta,
) {
    for spec in &desired.integrations {
        let existing = remote.integration(&spec.kind);
        match (spec.enabled, existing) {
            (true, None) => delta.integrations.to_create.push(spec.clone()),
            (true, Some(current)) if current.channel != spec.channel => {
                // Webhooks cannot be retargeted; replace.
                delta.integrations.to_delete.push(AdvisoryDeletion {
                    kind: ResourceKind::Integration,
                    name: format!("{} ({})", spec.kind, current.channel),
                    id: current.id.clone(),
                });
                delta.integrations.to_create.push(spec.clone());
            }
            (true, Some(_)) => {}
            (false, Some(current)) => delta.integrations.to_delete.push(AdvisoryDeletion {
                kind: ResourceKind::Integration,
                name: format!("{} ({})", spec.kind, current.channel),
                id: current.id.clone(),
            }),
            (false, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use guild_model::{
        CategorySpec, Color, Permission, RemoteCategory, RemoteIntegration, RemoteRole,
    };

    use super::*;

    fn role_spec(name: &str) -> RoleSpec {
        RoleSpec {
            name: name.to_string(),
            color: Color(0x3366ff),
            permissions: [Permission::ViewChannel].into_iter().collect(),
            hoist: false,
            mentionable: true,
        }
    }

    fn remote_role(id: &str, spec: &RoleSpec) -> RemoteRole {
        RemoteRole {
            id: RemoteId::from(id),
            name: spec.name.clone(),
            color: spec.color,
            permissions: spec.permissions.clone(),
            hoist: spec.hoist,
            mentionable: spec.mentionable,
        }
    }

    fn channel_spec(name: &str) -> ChannelSpec {
        ChannelSpec {
            name: name.to_string(),
            kind: ChannelKind::Text,
            topic: None,
            position: 0,
            overwrites: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    fn remote_channel(id: &str, spec: &ChannelSpec) -> RemoteChannel {
        RemoteChannel {
            id: RemoteId::from(id),
            name: spec.name.clone(),
            kind: spec.kind,
            topic: spec.topic.clone(),
            position: spec.position,
            overwrites: spec.overwrites.clone(),
        }
    }

    fn desired_with_channel(category: &str, channel: ChannelSpec) -> DesiredState {
        DesiredState {
            categories: vec![CategorySpec {
                name: category.to_string(),
                position: 0,
                channels: vec![channel],
            }],
            ..Default::default()
        }
    }

    fn remote_with_channel(category: &str, channel: RemoteChannel) -> RemoteStateSnapshot {
        RemoteStateSnapshot {
            categories: vec![RemoteCategory {
                id: RemoteId::from("c1"),
                name: category.to_string(),
                position: 0,
                channels: vec![channel],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn identical_states_yield_empty_delta() {
        let spec = role_spec("Member");
        let desired = DesiredState {
            roles: vec![spec.clone()],
            ..Default::default()
        };
        let remote = RemoteStateSnapshot {
            roles: vec![remote_role("r1", &spec)],
            ..Default::default()
        };
        let delta = diff(&desired, &remote).unwrap();
        assert!(delta.is_empty());
        assert!(delta.advisory_deletions().is_empty());
    }

    #[test]
    fn missing_role_is_created() {
        let desired = DesiredState {
            roles: vec![role_spec("Admin")],
            ..Default::default()
        };
        let delta = diff(&desired, &RemoteStateSnapshot::default()).unwrap();
        assert_eq!(delta.roles.to_create.len(), 1);
        assert_eq!(delta.roles.to_create[0].name, "Admin");
        assert!(delta.roles.to_update.is_empty());
    }

    #[test]
    fn drifted_role_yields_minimal_change_set() {
        let spec = role_spec("Mod");
        let mut existing = remote_role("r2", &spec);
        existing.color = Color(0x000000);
        existing.hoist = true;
        let desired = DesiredState {
            roles: vec![spec.clone()],
            ..Default::default()
        };
        let remote = RemoteStateSnapshot {
            roles: vec![existing],
            ..Default::default()
        };

        let delta = diff(&desired, &remote).unwrap();
        assert_eq!(delta.roles.to_update.len(), 1);
        let update = &delta.roles.to_update[0];
        assert_eq!(update.id, RemoteId::from("r2"));
        assert_eq!(
            update.changes,
            RoleChanges {
                color: Some(spec.color),
                hoist: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn unmanaged_role_becomes_advisory_deletion() {
        let remote = RemoteStateSnapshot {
            roles: vec![remote_role("r9", &role_spec("Legacy"))],
            ..Default::default()
        };
        let delta = diff(&DesiredState::default(), &remote).unwrap();
        assert!(delta.is_empty());
        assert_eq!(
            delta.roles.to_delete,
            vec![AdvisoryDeletion {
                kind: ResourceKind::Role,
                name: "Legacy".to_string(),
                id: RemoteId::from("r9"),
            }]
        );
    }

    #[test]
    fn everyone_is_never_flagged_for_deletion() {
        let mut builtin = remote_role("r0", &role_spec(EVERYONE));
        builtin.name = EVERYONE.to_string();
        let remote = RemoteStateSnapshot {
            roles: vec![builtin],
            ..Default::default()
        };
        let delta = diff(&DesiredState::default(), &remote).unwrap();
        assert!(delta.roles.to_delete.is_empty());
    }

    #[test]
    fn new_category_creates_its_channels_and_overwrites() {
        let mut channel = channel_spec("general");
        channel.overwrites.insert(
            "Mod".to_string(),
            PermissionOverwrite::new([Permission::ManageMessages], []),
        );
        let desired = desired_with_channel("Info", channel);

        let delta = diff(&desired, &RemoteStateSnapshot::default()).unwrap();
        assert_eq!(delta.categories.to_create.len(), 1);
        assert_eq!(delta.channels.to_create.len(), 1);
        assert_eq!(delta.overwrites.to_create.len(), 1);
        assert_eq!(delta.overwrites.to_create[0].role, "Mod");
    }

    #[test]
    fn matched_category_is_left_alone() {
        let desired = DesiredState {
            categories: vec![CategorySpec {
                name: "Info".to_string(),
                position: 3,
                channels: Vec::new(),
            }],
            ..Default::default()
        };
        let remote = RemoteStateSnapshot {
            categories: vec![RemoteCategory {
                id: RemoteId::from("c1"),
                name: "Info".to_string(),
                position: 0,
                channels: Vec::new(),
            }],
            ..Default::default()
        };
        let delta = diff(&desired, &remote).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn drifted_channel_topic_and_position_are_updated() {
        let mut spec = channel_spec("general");
        spec.topic = Some("welcome".to_string());
        spec.position = 2;
        let mut existing = remote_channel("ch1", &spec);
        existing.topic = Some("old".to_string());
        existing.position = 0;

        let desired = desired_with_channel("Info", spec);
        let remote = remote_with_channel("Info", existing);
        let delta = diff(&desired, &remote).unwrap();

        assert_eq!(delta.channels.to_update.len(), 1);
        assert_eq!(
            delta.channels.to_update[0].changes,
            ChannelChanges {
                topic: Some("welcome".to_string()),
                position: Some(2),
            }
        );
    }

    #[test]
    fn absent_desired_topic_does_not_clear_remote_topic() {
        let spec = channel_spec("general");
        let mut existing = remote_channel("ch1", &spec);
        existing.topic = Some("kept".to_string());

        let delta = diff(
            &desired_with_channel("Info", spec),
            &remote_with_channel("Info", existing),
        )
        .unwrap();
        assert!(delta.channels.to_update.is_empty());
    }

    #[test]
    fn kind_mismatch_is_a_conflict_not_an_update() {
        let mut spec = channel_spec("standup");
        spec.kind = ChannelKind::Voice;
        spec.topic = Some("daily".to_string());
        let mut existing = remote_channel("ch2", &spec);
        existing.kind = ChannelKind::Text;
        existing.topic = None;

        let delta = diff(
            &desired_with_channel("Team", spec),
            &remote_with_channel("Team", existing),
        )
        .unwrap();
        assert!(delta.channels.to_update.is_empty());
        assert_eq!(
            delta.kind_conflicts,
            vec![KindConflict {
                category: "Team".to_string(),
                channel: "standup".to_string(),
                desired: ChannelKind::Voice,
                remote: ChannelKind::Text,
            }]
        );
    }

    #[test]
    fn drifted_overwrite_is_replaced() {
        let mut spec = channel_spec("logs");
        spec.overwrites.insert(
            "Mod".to_string(),
            PermissionOverwrite::new([Permission::ViewChannel], []),
        );
        let mut existing = remote_channel("ch3", &spec);
        existing.overwrites.insert(
            "Mod".to_string(),
            PermissionOverwrite::new([], [Permission::ViewChannel]),
        );

        let delta = diff(
            &desired_with_channel("Ops", spec),
            &remote_with_channel("Ops", existing),
        )
        .unwrap();
        assert!(delta.overwrites.to_create.is_empty());
        assert_eq!(delta.overwrites.to_update.len(), 1);
        assert_eq!(
            delta.overwrites.to_update[0].overwrite,
            PermissionOverwrite::new([Permission::ViewChannel], [])
        );
    }

    #[test]
    fn remote_only_overwrite_for_managed_role_is_advisory() {
        let spec = channel_spec("logs");
        let mut existing = remote_channel("ch3", &spec);
        existing.overwrites.insert(
            "Mod".to_string(),
            PermissionOverwrite::new([], [Permission::SendMessages]),
        );

        let mut desired = desired_with_channel("Ops", spec);
        desired.roles.push(role_spec("Mod"));
        let mut remote = remote_with_channel("Ops", existing);
        remote.roles.push(remote_role("r2", &role_spec("Mod")));

        let delta = diff(&desired, &remote).unwrap();
        assert!(delta.is_empty());
        assert_eq!(delta.overwrites.to_delete.len(), 1);
        assert_eq!(delta.overwrites.to_delete[0].name, "Ops/logs:Mod");
    }

    #[test]
    fn remote_only_overwrite_for_unmanaged_role_is_ignored() {
        let spec = channel_spec("logs");
        let mut existing = remote_channel("ch3", &spec);
        existing.overwrites.insert(
            "Legacy".to_string(),
            PermissionOverwrite::new([], [Permission::SendMessages]),
        );

        let delta = diff(
            &desired_with_channel("Ops", spec),
            &remote_with_channel("Ops", existing),
        )
        .unwrap();
        assert!(delta.overwrites.to_delete.is_empty());
    }

    #[test]
    fn enabled_integration_missing_remotely_is_created() {
        let desired = DesiredState {
            integrations: vec![IntegrationSpec {
                kind: "github".to_string(),
                enabled: true,
                channel: "dev".to_string(),
                events: vec!["push".to_string()],
            }],
            ..Default::default()
        };
        let delta = diff(&desired, &RemoteStateSnapshot::default()).unwrap();
        assert_eq!(delta.integrations.to_create.len(), 1);
    }

    #[test]
    fn retargeted_integration_is_replaced() {
        let desired = DesiredState {
            integrations: vec![IntegrationSpec {
                kind: "github".to_string(),
                enabled: true,
                channel: "dev".to_string(),
                events: Vec::new(),
            }],
            ..Default::default()
        };
        let remote = RemoteStateSnapshot {
            integrations: vec![RemoteIntegration {
                id: RemoteId::from("w1"),
                kind: "github".to_string(),
                channel: "old-dev".to_string(),
                url: None,
            }],
            ..Default::default()
        };
        let delta = diff(&desired, &remote).unwrap();
        assert_eq!(delta.integrations.to_create.len(), 1);
        assert_eq!(delta.integrations.to_delete.len(), 1);
        assert_eq!(delta.integrations.to_delete[0].name, "github (old-dev)");
    }

    #[test]
    fn disabled_integration_present_remotely_is_advisory() {
        let desired = DesiredState {
            integrations: vec![IntegrationSpec {
                kind: "gitlab".to_string(),
                enabled: false,
                channel: "dev".to_string(),
                events: Vec::new(),
            }],
            ..Default::default()
        };
        let remote = RemoteStateSnapshot {
            integrations: vec![RemoteIntegration {
                id: RemoteId::from("w2"),
                kind: "gitlab".to_string(),
                channel: "dev".to_string(),
                url: None,
            }],
            ..Default::default()
        };
        let delta = diff(&desired, &remote).unwrap();
        assert!(delta.integrations.to_create.is_empty());
        assert_eq!(delta.integrations.to_delete.len(), 1);
    }

    #[test]
    fn invalid_desired_state_is_rejected() {
        let desired = DesiredState {
            roles: vec![role_spec("Dup"), role_spec("Dup")],
            ..Default::default()
        };
        assert!(diff(&desired, &RemoteStateSnapshot::default()).is_err());
    }
}
