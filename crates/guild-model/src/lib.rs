//! State models for Guild Manager
//!
//! This crate defines the two snapshots the reconciliation engine compares:
//!
//! - [`DesiredState`] — the configuration-derived target shape of server
//!   resources (roles, category/channel tree, webhook integrations)
//! - [`RemoteStateSnapshot`] — the live, observed shape of the same
//!   resources, each carrying an opaque [`RemoteId`]
//!
//! Identity is always name-based: desired state carries no remote IDs, and
//! resources are matched by `name` (channels by `(category, name)`). The
//! types here are pure data plus invariants — validation lives on
//! [`DesiredState::validate`], and no remote calls happen anywhere in this
//! crate.

mod changes;
mod desired;
mod error;
mod permissions;
mod remote;

pub use changes::{ChannelChanges, RoleChanges};
pub use desired::{
    CategorySpec, ChannelKind, ChannelSpec, Color, DesiredState, IntegrationSpec, RoleSpec,
    TagSpec,
};
pub use error::ValidationError;
pub use permissions::{Permission, PermissionOverwrite, PermissionSet};
pub use remote::{
    RemoteCategory, RemoteChannel, RemoteId, RemoteIntegration, RemoteRole, RemoteStateSnapshot,
};

/// The built-in role every server member holds. It is never managed by
/// configuration unless named explicitly, and backup export skips it.
pub const EVERYONE: &str = "@everyone";
