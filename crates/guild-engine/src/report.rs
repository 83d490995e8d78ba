//! Execution reporting
//!
//! The executor always returns a full [`ExecutionReport`]: one terminal
//! [`Outcome`] per planned operation, in plan order, regardless of how
//! many operations failed or were skipped along the way.

use chrono::{DateTime, Utc};
use serde::Serialize;

use guild_client::RemoteError;
use guild_model::RemoteId;

use crate::plan::{OpId, OperationKind};

/// Why an operation was skipped without being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A prerequisite operation failed or was itself skipped
    PrerequisiteFailed,
    /// Cancellation was requested before the operation was dispatched
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::PrerequisiteFailed => f.write_str("prerequisite failed"),
            SkipReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Terminal state of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied {
        /// ID assigned by the remote service, for creations
        #[serde(skip_serializing_if = "Option::is_none")]
        remote_id: Option<RemoteId>,
        /// Webhook URL, for integration configuration
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// True under dry-run: nothing was sent to the remote service
        simulated: bool,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        error: RemoteError,
        /// Attempts made, including the first
        attempts: u32,
    },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// One operation's identity and terminal outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub id: OpId,
    pub kind: OperationKind,
    pub outcome: Outcome,
}

/// What happened during one execution pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    /// Results in plan order, one per planned operation
    pub results: Vec<OperationResult>,
}

impl ExecutionReport {
    pub fn applied(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.is_applied())
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count()
    }

    /// True when every operation applied
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_applied())
    }

    /// Look up the outcome of one operation
    pub fn outcome_of(&self, id: &OpId) -> Option<&Outcome> {
        self.results.iter().find(|r| &r.id == id).map(|r| &r.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(results: Vec<OperationResult>) -> ExecutionReport {
        let now = Utc::now();
        ExecutionReport {
            started_at: now,
            finished_at: now,
            dry_run: false,
            results,
        }
    }

    fn applied(id: OpId) -> OperationResult {
        OperationResult {
            id,
            kind: OperationKind::CreateRole,
            outcome: Outcome::Applied {
                remote_id: Some(RemoteId::from("r1")),
                url: None,
                simulated: false,
            },
        }
    }

    #[test]
    fn counts_partition_the_results() {
        let report = report(vec![
            applied(OpId::role("A")),
            OperationResult {
                id: OpId::role("B"),
                kind: OperationKind::CreateRole,
                outcome: Outcome::Failed {
                    error: RemoteError::Forbidden {
                        action: "create_role".to_string(),
                    },
                    attempts: 1,
                },
            },
            OperationResult {
                id: OpId::overwrite("Info", "general", "B"),
                kind: OperationKind::SetPermissionOverwrite,
                outcome: Outcome::Skipped {
                    reason: SkipReason::PrerequisiteFailed,
                },
            },
        ]);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn empty_report_is_success() {
        assert!(report(Vec::new()).is_success());
    }

    #[test]
    fn outcome_lookup_by_id() {
        let r = report(vec![applied(OpId::role("A"))]);
        assert!(r.outcome_of(&OpId::role("A")).unwrap().is_applied());
        assert!(r.outcome_of(&OpId::role("Z")).is_none());
    }
}
