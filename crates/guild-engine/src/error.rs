//! Engine error types

use guild_model::ValidationError;

/// Error raised while computing a diff or building a plan
///
/// Execution failures are never surfaced here: the executor records them
/// per operation in the [`crate::ExecutionReport`] and always returns one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The desired state violates a structural invariant
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An operation references a resource that neither exists remotely
    /// nor is created earlier in the same plan
    #[error("unresolved dependency: {kind} '{name}' required by {required_by}")]
    UnresolvedDependency {
        kind: String,
        name: String,
        required_by: String,
    },
}

/// Convenience alias used across the engine crate
pub type Result<T> = std::result::Result<T, EngineError>;
