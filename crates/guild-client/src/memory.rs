//! In-memory remote implementation
//!
//! [`InMemoryGuild`] behaves like a real server held in process: mutations
//! update a [`RemoteStateSnapshot`] that later fetches observe, IDs are
//! allocated on create, and failures can be injected per operation. The
//! CLI's simulated apply runs against it, and so do the executor tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;

use guild_model::{
    ChannelChanges, ChannelSpec, Color, EVERYONE, PermissionOverwrite, PermissionSet,
    RemoteCategory, RemoteChannel, RemoteId, RemoteIntegration, RemoteRole, RemoteStateSnapshot,
    RoleChanges, RoleSpec,
};

use crate::client::RemoteClient;
use crate::error::RemoteError;

/// How an injected failure behaves
enum FailureMode {
    /// Fail every call with this error
    Always(RemoteError),
    /// Fail the next `n` calls, then succeed
    Times(RemoteError, u32),
}

/// An in-process remote server with failure injection
///
/// Operation keys for failure injection follow the shape
/// `"{method}:{name-or-id}"`, e.g. `"create_role:Admin"` or
/// `"create_webhook:github"`.
#[derive(Default)]
pub struct InMemoryGuild {
    state: Mutex<RemoteStateSnapshot>,
    failures: Mutex<HashMap<String, FailureMode>>,
    log: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

impl InMemoryGuild {
    /// A fresh server: no categories or integrations, only the built-in
    /// `@everyone` role every server starts with
    pub fn new() -> Self {
        Self::seeded(RemoteStateSnapshot {
            roles: vec![RemoteRole {
                id: RemoteId::from("everyone"),
                name: EVERYONE.to_string(),
                color: Color(0),
                permissions: PermissionSet::new(),
                hoist: false,
                mentionable: false,
            }],
            ..Default::default()
        })
    }

    /// A server seeded with existing state
    pub fn seeded(snapshot: RemoteStateSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    /// Make every call matching `key` fail with `error`
    pub fn fail_with(&self, key: impl Into<String>, error: RemoteError) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(key.into(), FailureMode::Always(error));
    }

    /// Make the next `times` calls matching `key` fail, then succeed
    pub fn fail_times(&self, key: impl Into<String>, error: RemoteError, times: u32) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(key.into(), FailureMode::Times(error, times));
    }

    /// Every mutating call recorded so far, in call order
    pub fn mutation_log(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }

    /// A copy of the current server state
    pub fn snapshot(&self) -> RemoteStateSnapshot {
        self.state.lock().expect("state lock").clone()
    }

    fn check_failure(&self, key: &str) -> Result<(), RemoteError> {
        let mut failures = self.failures.lock().expect("failures lock");
        match failures.get_mut(key) {
            Some(FailureMode::Always(error)) => Err(error.clone()),
            Some(FailureMode::Times(error, times)) => {
                let error = error.clone();
                *times -= 1;
                if *times == 0 {
                    failures.remove(key);
                }
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn record(&self, key: &str) -> Result<(), RemoteError> {
        self.check_failure(key)?;
        debug!(operation = %key, "in-memory mutation");
        self.log.lock().expect("log lock").push(key.to_string());
        Ok(())
    }

    fn alloc_id(&self) -> RemoteId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        RemoteId::new(format!("mem-{n}"))
    }

    fn role_name_for(state: &RemoteStateSnapshot, id: &RemoteId) -> Option<String> {
        state.roles.iter().find(|r| &r.id == id).map(|r| r.name.clone())
    }
}

#[async_trait]
impl RemoteClient for InMemoryGuild {
    async fn fetch_roles(&self) -> Result<Vec<RemoteRole>, RemoteError> {
        self.check_failure("fetch_roles")?;
        Ok(self.state.lock().expect("state lock").roles.clone())
    }

    async fn fetch_channels(&self) -> Result<Vec<RemoteCategory>, RemoteError> {
        self.check_failure("fetch_channels")?;
        Ok(self.state.lock().expect("state lock").categories.clone())
    }

    async fn fetch_integrations(&self) -> Result<Vec<RemoteIntegration>, RemoteError> {
        self.check_failure("fetch_integrations")?;
        Ok(self.state.lock().expect("state lock").integrations.clone())
    }

    async fn create_role(&self, spec: &RoleSpec) -> Result<RemoteId, RemoteError> {
        self.record(&format!("create_role:{}", spec.name))?;
        let id = self.alloc_id();
        let mut state = self.state.lock().expect("state lock");
        state.roles.push(RemoteRole {
            id: id.clone(),
            name: spec.name.clone(),
            color: spec.color,
            permissions: spec.permissions.clone(),
            hoist: spec.hoist,
            mentionable: spec.mentionable,
        });
        Ok(id)
    }

    async fn update_role(&self, id: &RemoteId, changes: &RoleChanges) -> Result<(), RemoteError> {
        self.record(&format!("update_role:{id}"))?;
        let mut state = self.state.lock().expect("state lock");
        let role = state
            .roles
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| RemoteError::NotFound {
                resource: format!("role {id}"),
            })?;
        if let Some(color) = changes.color {
            role.color = color;
        }
        if let Some(permissions) = &changes.permissions {
            role.permissions = permissions.clone();
        }
        if let Some(hoist) = changes.hoist {
            role.hoist = hoist;
        }
        if let Some(mentionable) = changes.mentionable {
            role.mentionable = mentionable;
        }
        Ok(())
    }

    async fn create_category(&self, name: &str, position: i32) -> Result<RemoteId, RemoteError> {
        self.record(&format!("create_category:{name}"))?;
        let id = self.alloc_id();
        let mut state = self.state.lock().expect("state lock");
        state.categories.push(RemoteCategory {
            id: id.clone(),
            name: name.to_string(),
            position,
            channels: Vec::new(),
        });
        Ok(id)
    }

    async fn create_channel(
        &self,
        spec: &ChannelSpec,
        parent: &RemoteId,
    ) -> Result<RemoteId, RemoteError> {
        self.record(&format!("create_channel:{}", spec.name))?;
        let id = self.alloc_id();
        let mut state = self.state.lock().expect("state lock");
        let category = state
            .categories
            .iter_mut()
            .find(|c| &c.id == parent)
            .ok_or_else(|| RemoteError::NotFound {
                resource: format!("category {parent}"),
            })?;
        category.channels.push(RemoteChannel {
            id: id.clone(),
            name: spec.name.clone(),
            kind: spec.kind,
            topic: spec.topic.clone(),
            position: spec.position,
            overwrites: Default::default(),
        });
        Ok(id)
    }

    async fn update_channel(
        &self,
        id: &RemoteId,
        changes: &ChannelChanges,
    ) -> Result<(), RemoteError> {
        self.record(&format!("update_channel:{id}"))?;
        let mut state = self.state.lock().expect("state lock");
        let channel = state
            .categories
            .iter_mut()
            .flat_map(|c| c.channels.iter_mut())
            .find(|c| &c.id == id)
            .ok_or_else(|| RemoteError::NotFound {
                resource: format!("channel {id}"),
            })?;
        if let Some(topic) = &changes.topic {
            channel.topic = Some(topic.clone());
        }
        if let Some(position) = changes.position {
            channel.position = position;
        }
        Ok(())
    }

    async fn set_permission_overwrite(
        &self,
        channel: &RemoteId,
        role: &RemoteId,
        overwrite: &PermissionOverwrite,
    ) -> Result<(), RemoteError> {
        self.record(&format!("set_overwrite:{channel}:{role}"))?;
        let mut state = self.state.lock().expect("state lock");
        let role_name =
            Self::role_name_for(&state, role).ok_or_else(|| RemoteError::NotFound {
                resource: format!("role {role}"),
            })?;
        let target = state
            .categories
            .iter_mut()
            .flat_map(|c| c.channels.iter_mut())
            .find(|c| &c.id == channel)
            .ok_or_else(|| RemoteError::NotFound {
                resource: format!("channel {channel}"),
            })?;
        target.overwrites.insert(role_name, overwrite.clone());
        Ok(())
    }

    async fn create_webhook(&self, channel: &RemoteId, kind: &str) -> Result<String, RemoteError> {
        self.record(&format!("create_webhook:{kind}"))?;
        let id = self.alloc_id();
        let mut state = self.state.lock().expect("state lock");
        let channel_name = state
            .categories
            .iter()
            .flat_map(|c| c.channels.iter())
            .find(|c| &c.id == channel)
            .map(|c| c.name.clone())
            .ok_or_else(|| RemoteError::NotFound {
                resource: format!("channel {channel}"),
            })?;
        let url = format!("https://remote.example/webhooks/{id}/{kind}");
        state.integrations.push(RemoteIntegration {
            id,
            kind: kind.to_string(),
            channel: channel_name,
            url: Some(url.clone()),
        });
        Ok(url)
    }
}
