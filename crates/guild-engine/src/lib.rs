//! Reconciliation engine for Guild Manager
//!
//! The pipeline runs in three pure-to-effectful stages:
//!
//! 1. [`diff`] compares desired configuration against an observed
//!    snapshot and yields a [`ResourceDelta`].
//! 2. [`build_plan`] orders the delta's creations and updates into a
//!    deterministic, dependency-annotated [`MutationPlan`].
//! 3. [`Executor::execute`] applies the plan through a
//!    [`guild_client::RemoteClient`] and reports per-operation outcomes.
//!
//! Deletions never enter a plan. Remote resources without a desired
//! counterpart are surfaced as advisory deletions for the operator.

mod diff;
mod error;
mod executor;
mod plan;
mod report;
mod retry;

pub use diff::{
    AdvisoryDeletion, CategoryCreate, CategoryDelta, ChannelCreate, ChannelDelta, ChannelUpdate,
    IntegrationDelta, KindConflict, OverwriteDelta, OverwriteSet, ResourceDelta, ResourceKind,
    RoleDelta, RoleUpdate, diff,
};
pub use error::{EngineError, Result};
pub use executor::{CancelToken, ExecuteOptions, Executor};
pub use plan::{
    ChannelRef, MutationPlan, OpId, Operation, OperationKind, OperationPayload, ResourceRef,
    build_plan,
};
pub use report::{ExecutionReport, OperationResult, Outcome, SkipReason};
pub use retry::RetryConfig;

use serde::Serialize;

use guild_model::{DesiredState, RemoteStateSnapshot};

/// A plan plus everything the engine wants a human to look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOutcome {
    pub plan: MutationPlan,
    /// Remote resources with no configuration counterpart; never executed
    pub advisory_deletions: Vec<AdvisoryDeletion>,
    /// Channels frozen by an immutable-kind mismatch
    pub kind_conflicts: Vec<KindConflict>,
}

impl PlanOutcome {
    /// True when there is nothing to apply and nothing to report
    pub fn is_noop(&self) -> bool {
        self.plan.is_empty()
            && self.advisory_deletions.is_empty()
            && self.kind_conflicts.is_empty()
    }
}

/// Diff desired against remote state and build the mutation plan
pub fn plan(desired: &DesiredState, remote: &RemoteStateSnapshot) -> Result<PlanOutcome> {
    let delta = diff(desired, remote)?;
    let advisory_deletions = delta.advisory_deletions();
    let kind_conflicts = delta.kind_conflicts.clone();
    let plan = build_plan(&delta, remote)?;
    Ok(PlanOutcome {
        plan,
        advisory_deletions,
        kind_conflicts,
    })
}
