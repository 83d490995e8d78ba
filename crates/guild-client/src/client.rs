//! The `RemoteClient` capability trait

use async_trait::async_trait;

use guild_model::{
    ChannelChanges, ChannelSpec, PermissionOverwrite, RemoteCategory, RemoteId, RemoteIntegration,
    RemoteRole, RemoteStateSnapshot, RoleChanges, RoleSpec,
};

use crate::error::RemoteError;

/// Capability interface over the remote collaboration-platform service
///
/// Fetches observe state; the remaining methods mutate it. Every method
/// fails independently with a [`RemoteError`]. Implementations must be
/// safe to call concurrently — the executor dispatches independent
/// operations from multiple tasks.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch all roles, including built-ins such as `@everyone`
    async fn fetch_roles(&self) -> Result<Vec<RemoteRole>, RemoteError>;

    /// Fetch the category tree with channels and permission overwrites
    async fn fetch_channels(&self) -> Result<Vec<RemoteCategory>, RemoteError>;

    /// Fetch configured webhook integrations
    async fn fetch_integrations(&self) -> Result<Vec<RemoteIntegration>, RemoteError>;

    /// Create a role, returning its assigned ID
    async fn create_role(&self, spec: &RoleSpec) -> Result<RemoteId, RemoteError>;

    /// Apply a field-level change set to an existing role
    async fn update_role(&self, id: &RemoteId, changes: &RoleChanges) -> Result<(), RemoteError>;

    /// Create a category, returning its assigned ID
    async fn create_category(&self, name: &str, position: i32) -> Result<RemoteId, RemoteError>;

    /// Create a channel under an existing category, returning its ID
    ///
    /// The payload includes the channel's permission overwrites only by
    /// name; overwrites are applied separately via
    /// [`RemoteClient::set_permission_overwrite`] once role IDs are known.
    async fn create_channel(
        &self,
        spec: &ChannelSpec,
        parent: &RemoteId,
    ) -> Result<RemoteId, RemoteError>;

    /// Apply a field-level change set to an existing channel
    async fn update_channel(
        &self,
        id: &RemoteId,
        changes: &ChannelChanges,
    ) -> Result<(), RemoteError>;

    /// Set (or replace) the overwrite for one role on one channel
    async fn set_permission_overwrite(
        &self,
        channel: &RemoteId,
        role: &RemoteId,
        overwrite: &PermissionOverwrite,
    ) -> Result<(), RemoteError>;

    /// Create a webhook on a channel, returning the webhook URL
    async fn create_webhook(&self, channel: &RemoteId, kind: &str) -> Result<String, RemoteError>;
}

/// Fetch a complete [`RemoteStateSnapshot`] in one pass
///
/// The snapshot is taken once per invocation; staleness between fetch
/// and apply is accepted and resolved by idempotent re-runs.
pub async fn fetch_snapshot(client: &dyn RemoteClient) -> Result<RemoteStateSnapshot, RemoteError> {
    let roles = client.fetch_roles().await?;
    let categories = client.fetch_channels().await?;
    let integrations = client.fetch_integrations().await?;
    Ok(RemoteStateSnapshot {
        roles,
        categories,
        integrations,
    })
}
