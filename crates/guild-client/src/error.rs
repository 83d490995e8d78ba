//! Typed errors for remote calls

use serde::{Deserialize, Serialize};

/// Error returned by a single remote call
///
/// Remote errors are per-operation: the executor records them in the
/// execution report and keeps going on independent branches of the plan.
/// Only the retryable variants ([`RemoteError::RateLimited`] and
/// [`RemoteError::Transient`]) are retried, with bounded backoff.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteError {
    /// The targeted resource does not exist on the remote service
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The credential lacks permission for this mutation
    #[error("forbidden: {action}")]
    Forbidden { action: String },

    /// The service asked us to slow down
    #[error("rate limited")]
    RateLimited {
        /// Server-suggested wait before retrying, when provided
        retry_after_ms: Option<u64>,
    },

    /// A transient network or service failure worth retrying
    #[error("transient failure: {message}")]
    Transient { message: String },

    /// Anything else the remote service reported
    #[error("remote error: {message}")]
    Unknown { message: String },
}

impl RemoteError {
    /// True for failures that a bounded retry may resolve
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::RateLimited { .. } | RemoteError::Transient { .. }
        )
    }
}
