//! Plan construction
//!
//! [`build_plan`] turns a [`ResourceDelta`] into a [`MutationPlan`]: a
//! dependency-ordered list of operations with deterministic identifiers.
//! Two runs over the same delta and snapshot produce byte-identical
//! plans, which keeps dry-run output reviewable and diffs of plans
//! meaningful.
//!
//! Dependency edges always point at operations that appear earlier in
//! the list, so sequential execution in list order is always valid and
//! concurrent execution only has to wait on explicit edges.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use guild_model::{
    ChannelChanges, ChannelSpec, PermissionOverwrite, RemoteId, RemoteStateSnapshot, RoleChanges,
    RoleSpec,
};

use crate::diff::ResourceDelta;
use crate::error::{EngineError, Result};

/// Deterministic operation identifier
///
/// Derived from the target resource path, never from randomness, so the
/// same drift always produces the same identifiers across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OpId(String);

impl OpId {
    pub fn role(name: &str) -> Self {
        Self(format!("role/{name}"))
    }

    pub fn category(name: &str) -> Self {
        Self(format!("category/{name}"))
    }

    pub fn channel(category: &str, name: &str) -> Self {
        Self(format!("channel/{category}/{name}"))
    }

    pub fn overwrite(category: &str, channel: &str, role: &str) -> Self {
        Self(format!("overwrite/{category}/{channel}/{role}"))
    }

    pub fn integration(kind: &str) -> Self {
        Self(format!("integration/{kind}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The mutation vocabulary
///
/// Deliberately contains no delete variant: deletions stay advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateRole,
    UpdateRole,
    CreateCategory,
    CreateChannel,
    UpdateChannel,
    SetPermissionOverwrite,
    ConfigureIntegration,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::CreateRole => "create_role",
            OperationKind::UpdateRole => "update_role",
            OperationKind::CreateCategory => "create_category",
            OperationKind::CreateChannel => "create_channel",
            OperationKind::UpdateChannel => "update_channel",
            OperationKind::SetPermissionOverwrite => "set_permission_overwrite",
            OperationKind::ConfigureIntegration => "configure_integration",
        };
        f.write_str(name)
    }
}

/// Reference to a role or category an operation acts through
///
/// `id` is `Some` when the resource already exists remotely; `None`
/// means it is created earlier in the same plan and the executor
/// resolves the ID at runtime from the creating operation's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
}

/// Reference to a channel, qualified by its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRef {
    pub category: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
}

/// The full payload of one planned mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationPayload {
    CreateRole {
        spec: RoleSpec,
    },
    UpdateRole {
        name: String,
        id: RemoteId,
        changes: RoleChanges,
    },
    CreateCategory {
        name: String,
        position: i32,
    },
    CreateChannel {
        category: ResourceRef,
        spec: ChannelSpec,
    },
    UpdateChannel {
        channel: ChannelRef,
        changes: ChannelChanges,
    },
    SetPermissionOverwrite {
        channel: ChannelRef,
        role: ResourceRef,
        overwrite: PermissionOverwrite,
    },
    ConfigureIntegration {
        kind: String,
        channel: ChannelRef,
        events: Vec<String>,
    },
}

impl OperationPayload {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationPayload::CreateRole { .. } => OperationKind::CreateRole,
            OperationPayload::UpdateRole { .. } => OperationKind::UpdateRole,
            OperationPayload::CreateCategory { .. } => OperationKind::CreateCategory,
            OperationPayload::CreateChannel { .. } => OperationKind::CreateChannel,
            OperationPayload::UpdateChannel { .. } => OperationKind::UpdateChannel,
            OperationPayload::SetPermissionOverwrite { .. } => {
                OperationKind::SetPermissionOverwrite
            }
            OperationPayload::ConfigureIntegration { .. } => OperationKind::ConfigureIntegration,
        }
    }
}

/// One planned mutation and its prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub id: OpId,
    pub payload: OperationPayload,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<OpId>,
}

/// A dependency-ordered list of mutations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MutationPlan {
    pub operations: Vec<Operation>,
}

impl MutationPlan {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn get(&self, id: &OpId) -> Option<&Operation> {
        self.operations.iter().find(|op| &op.id == id)
    }
}

/// Build an executable plan from a delta
///
/// Ordering within each phase is total: creations sort by ascending
/// position then name, everything else by name, so equal inputs yield
/// equal plans. `remote` supplies the IDs of pre-existing resources;
/// any reference that resolves neither remotely nor to a creation in
/// the same plan is an [`EngineError::UnresolvedDependency`].
pub fn build_plan(delta: &ResourceDelta, remote: &RemoteStateSnapshot) -> Result<MutationPlan> {
    let mut operations = Vec::new();

    let created_roles: BTreeSet<&str> = delta
        .roles
        .to_create
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    let created_categories: BTreeSet<&str> = delta
        .categories
        .to_create
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    let created_channels: BTreeSet<(&str, &str)> = delta
        .channels
        .to_create
        .iter()
        .map(|c| (c.category.as_str(), c.spec.name.as_str()))
        .collect();
    // Bare channel name to (category, name), for integration targets.
    let mut created_by_name: HashMap<&str, (&str, &str)> = HashMap::new();
    for create in &delta.channels.to_create {
        created_by_name
            .entry(create.spec.name.as_str())
            .or_insert((create.category.as_str(), create.spec.name.as_str()));
    }

    let mut role_creates: Vec<_> = delta.roles.to_create.iter().collect();
    role_creates.sort_by_key(|r| r.name.as_str());
    for spec in role_creates {
        operations.push(Operation {
            id: OpId::role(&spec.name),
            payload: OperationPayload::CreateRole { spec: spec.clone() },
            depends_on: BTreeSet::new(),
        });
    }

    let mut role_updates: Vec<_> = delta.roles.to_update.iter().collect();
    role_updates.sort_by_key(|u| u.name.as_str());
    for update in role_updates {
        operations.push(Operation {
            id: OpId::role(&update.name),
            payload: OperationPayload::UpdateRole {
                name: update.name.clone(),
                id: update.id.clone(),
                changes: update.changes.clone(),
            },
            depends_on: BTreeSet::new(),
        });
    }

    let mut category_creates: Vec<_> = delta.categories.to_create.iter().collect();
    category_creates.sort_by(|a, b| (a.position, &a.name).cmp(&(b.position, &b.name)));
    for create in category_creates {
        operations.push(Operation {
            id: OpId::category(&create.name),
            payload: OperationPayload::CreateCategory {
                name: create.name.clone(),
                position: create.position,
            },
            depends_on: BTreeSet::new(),
        });
    }

    let mut channel_creates: Vec<_> = delta.channels.to_create.iter().collect();
    channel_creates.sort_by(|a, b| {
        (a.spec.position, &a.category, &a.spec.name).cmp(&(b.spec.position, &b.category, &b.spec.name))
    });
    for create in channel_creates {
        let mut depends_on = BTreeSet::new();
        let category = if created_categories.contains(create.category.as_str()) {
            depends_on.insert(OpId::category(&create.category));
            ResourceRef {
                name: create.category.clone(),
                id: None,
            }
        } else {
            let existing = remote.category(&create.category).ok_or_else(|| {
                EngineError::UnresolvedDependency {
                    kind: "category".to_string(),
                    name: create.category.clone(),
                    required_by: OpId::channel(&create.category, &create.spec.name).to_string(),
                }
            })?;
            ResourceRef {
                name: create.category.clone(),
                id: Some(existing.id.clone()),
            }
        };
        operations.push(Operation {
            id: OpId::channel(&create.category, &create.spec.name),
            payload: OperationPayload::CreateChannel {
                category,
                spec: create.spec.clone(),
            },
            depends_on,
        });
    }

    let mut channel_updates: Vec<_> = delta.channels.to_update.iter().collect();
    channel_updates.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
    for update in channel_updates {
        operations.push(Operation {
            id: OpId::channel(&update.category, &update.name),
            payload: OperationPayload::UpdateChannel {
                channel: ChannelRef {
                    category: update.category.clone(),
                    name: update.name.clone(),
                    id: Some(update.id.clone()),
                },
                changes: update.changes.clone(),
            },
            depends_on: BTreeSet::new(),
        });
    }

    let mut overwrite_sets: Vec<_> = delta
        .overwrites
        .to_create
        .iter()
        .chain(delta.overwrites.to_update.iter())
        .collect();
    overwrite_sets.sort_by(|a, b| {
        (&a.category, &a.channel, &a.role).cmp(&(&b.category, &b.channel, &b.role))
    });
    for set in overwrite_sets {
        let op_id = OpId::overwrite(&set.category, &set.channel, &set.role);
        let mut depends_on = BTreeSet::new();

        let channel = if created_channels.contains(&(set.category.as_str(), set.channel.as_str()))
        {
            depends_on.insert(OpId::channel(&set.category, &set.channel));
            ChannelRef {
                category: set.category.clone(),
                name: set.channel.clone(),
                id: None,
            }
        } else {
            let existing = remote.channel(&set.category, &set.channel).ok_or_else(|| {
                EngineError::UnresolvedDependency {
                    kind: "channel".to_string(),
                    name: format!("{}/{}", set.category, set.channel),
                    required_by: op_id.to_string(),
                }
            })?;
            ChannelRef {
                category: set.category.clone(),
                name: set.channel.clone(),
                id: Some(existing.id.clone()),
            }
        };

        let role = if created_roles.contains(set.role.as_str()) {
            depends_on.insert(OpId::role(&set.role));
            ResourceRef {
                name: set.role.clone(),
                id: None,
            }
        } else {
            let existing =
                remote
                    .role(&set.role)
                    .ok_or_else(|| EngineError::UnresolvedDependency {
                        kind: "role".to_string(),
                        name: set.role.clone(),
                        required_by: op_id.to_string(),
                    })?;
            ResourceRef {
                name: set.role.clone(),
                id: Some(existing.id.clone()),
            }
        };

        operations.push(Operation {
            id: op_id,
            payload: OperationPayload::SetPermissionOverwrite {
                channel,
                role,
                overwrite: set.overwrite.clone(),
            },
            depends_on,
        });
    }

    let mut integration_creates: Vec<_> = delta.integrations.to_create.iter().collect();
    integration_creates.sort_by_key(|i| i.kind.as_str());
    for spec in integration_creates {
        let op_id = OpId::integration(&spec.kind);
        let mut depends_on = BTreeSet::new();
        let channel = if let Some((category, channel)) = remote.find_channel(&spec.channel) {
            ChannelRef {
                category: category.name.clone(),
                name: channel.name.clone(),
                id: Some(channel.id.clone()),
            }
        } else if let Some((category, name)) = created_by_name.get(spec.channel.as_str()) {
            depends_on.insert(OpId::channel(category, name));
            ChannelRef {
                category: (*category).to_string(),
                name: (*name).to_string(),
                id: None,
            }
        } else {
            return Err(EngineError::UnresolvedDependency {
                kind: "channel".to_string(),
                name: spec.channel.clone(),
                required_by: op_id.to_string(),
            });
        };

        operations.push(Operation {
            id: op_id,
            payload: OperationPayload::ConfigureIntegration {
                kind: spec.kind.clone(),
                channel,
                events: spec.events.clone(),
            },
            depends_on,
        });
    }

    debug!(operations = operations.len(), "built mutation plan");
    Ok(MutationPlan { operations })
}
