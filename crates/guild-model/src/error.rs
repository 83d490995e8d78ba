//! Validation errors for desired-state models

use crate::permissions::Permission;

/// Errors raised while validating a [`crate::DesiredState`]
///
/// Validation failures are fatal: the engine refuses to diff or plan a
/// desired state that contains any of these, so no remote call is ever
/// made on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Two roles share the same name
    #[error("duplicate role name: {name}")]
    DuplicateRole { name: String },

    /// Two categories share the same name
    #[error("duplicate category name: {name}")]
    DuplicateCategory { name: String },

    /// Two channels share the same name within one category
    #[error("duplicate channel name {name} in category {category}")]
    DuplicateChannel { category: String, name: String },

    /// Two integrations share the same kind
    #[error("duplicate integration kind: {kind}")]
    DuplicateIntegration { kind: String },

    /// A permission appears in both the allow and deny set of one overwrite
    #[error(
        "permission {permission} is both allowed and denied for role {role} on channel {channel}"
    )]
    ConflictingPermission {
        channel: String,
        role: String,
        permission: Permission,
    },

    /// A color value is not a `#rrggbb` hex string
    #[error("invalid color value: {value} (expected #rrggbb)")]
    InvalidColor { value: String },
}
