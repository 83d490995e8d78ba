//! Ready-made desired states and remote snapshots.
//!
//! The fixtures model a small project server: two roles, an `Info`
//! category with two text channels, and a GitHub webhook. Builders are
//! deliberately plain functions; tests mutate the returned values to
//! set up drift.

use std::collections::BTreeMap;

use guild_model::{
    CategorySpec, ChannelKind, ChannelSpec, Color, DesiredState, IntegrationSpec, Permission,
    PermissionOverwrite, PermissionSet, RemoteCategory, RemoteChannel, RemoteId,
    RemoteIntegration, RemoteRole, RemoteStateSnapshot, RoleSpec,
};

/// A role spec with sensible defaults
pub fn role(name: &str) -> RoleSpec {
    RoleSpec {
        name: name.to_string(),
        color: Color(0x3366ff),
        permissions: [Permission::ViewChannel, Permission::SendMessages]
            .into_iter()
            .collect(),
        hoist: false,
        mentionable: false,
    }
}

/// A text channel spec with no topic or overwrites
pub fn text_channel(name: &str, position: i32) -> ChannelSpec {
    ChannelSpec {
        name: name.to_string(),
        kind: ChannelKind::Text,
        topic: None,
        position,
        overwrites: BTreeMap::new(),
        tags: Vec::new(),
    }
}

/// The standard project-server desired state used across suites
pub fn project_server() -> DesiredState {
    let mut announcements = text_channel("announcements", 0);
    announcements.topic = Some("Project announcements".to_string());
    announcements.overwrites.insert(
        "@everyone".to_string(),
        PermissionOverwrite::new([], [Permission::SendMessages]),
    );
    announcements.overwrites.insert(
        "Mod".to_string(),
        PermissionOverwrite::new([Permission::SendMessages, Permission::ManageMessages], []),
    );

    DesiredState {
        roles: vec![role("Mod"), role("Member")],
        categories: vec![CategorySpec {
            name: "Info".to_string(),
            position: 0,
            channels: vec![announcements, text_channel("general", 1)],
        }],
        integrations: vec![IntegrationSpec {
            kind: "github".to_string(),
            enabled: true,
            channel: "general".to_string(),
            events: vec!["push".to_string(), "release".to_string()],
        }],
    }
}

/// A remote snapshot exactly matching [`project_server`]
///
/// Includes the built-in `@everyone` role, which every real server has.
pub fn project_snapshot() -> RemoteStateSnapshot {
    let desired = project_server();
    let mut roles = vec![RemoteRole {
        id: RemoteId::from("r0"),
        name: "@everyone".to_string(),
        color: Color(0),
        permissions: PermissionSet::new(),
        hoist: false,
        mentionable: false,
    }];
    roles.extend(desired.roles.iter().enumerate().map(|(i, spec)| RemoteRole {
        id: RemoteId::new(format!("r{}", i + 1)),
        name: spec.name.clone(),
        color: spec.color,
        permissions: spec.permissions.clone(),
        hoist: spec.hoist,
        mentionable: spec.mentionable,
    }));

    let categories = desired
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| RemoteCategory {
            id: RemoteId::new(format!("c{}", i + 1)),
            name: category.name.clone(),
            position: category.position,
            channels: category
                .channels
                .iter()
                .enumerate()
                .map(|(j, channel)| RemoteChannel {
                    id: RemoteId::new(format!("ch{}-{}", i + 1, j + 1)),
                    name: channel.name.clone(),
                    kind: channel.kind,
                    topic: channel.topic.clone(),
                    position: channel.position,
                    overwrites: channel.overwrites.clone(),
                })
                .collect(),
        })
        .collect();

    let integrations = desired
        .integrations
        .iter()
        .enumerate()
        .map(|(i, spec)| RemoteIntegration {
            id: RemoteId::new(format!("w{}", i + 1)),
            kind: spec.kind.clone(),
            channel: spec.channel.clone(),
            url: Some(format!("https://remote.example/webhooks/w{}/{}", i + 1, spec.kind)),
        })
        .collect();

    RemoteStateSnapshot {
        roles,
        categories,
        integrations,
    }
}
