//! Plan execution
//!
//! The executor walks a [`MutationPlan`] and applies each operation
//! through a [`RemoteClient`]. Independent operations run concurrently
//! up to a semaphore-bounded limit; an operation is dispatched only once
//! every prerequisite has reached a terminal outcome. Failures are
//! isolated: a failed operation skips its dependents and nothing else.
//!
//! Execution never aborts the pass. Whatever happens, the caller gets an
//! [`ExecutionReport`] with one terminal outcome per planned operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, warn};

use guild_client::{RemoteClient, RemoteError};
use guild_model::RemoteId;

use crate::plan::{ChannelRef, MutationPlan, OpId, OperationPayload, ResourceRef};
use crate::report::{ExecutionReport, OperationResult, Outcome, SkipReason};
use crate::retry::RetryConfig;

/// Cooperative cancellation flag
///
/// Cancelling stops new dispatches; operations already in flight run to
/// completion so the report never contains a half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Knobs for one execution pass
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Record every runnable operation as simulated instead of calling
    /// the remote service
    pub dry_run: bool,
    /// Maximum operations in flight at once
    pub concurrency: usize,
    pub retry: RetryConfig,
    pub cancel: CancelToken,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: 4,
            retry: RetryConfig::default(),
            cancel: CancelToken::new(),
        }
    }
}

/// What a successful client call produced
enum ApplyOutput {
    Created(RemoteId),
    Done,
    Webhook(String),
}

/// IDs assigned to resources created during this pass, keyed by the
/// operation that created them
type CreatedIds = Mutex<HashMap<OpId, RemoteId>>;

/// Applies mutation plans through a [`RemoteClient`]
pub struct Executor {
    client: Arc<dyn RemoteClient>,
}

impl Executor {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self { client }
    }

    /// Execute every operation in the plan and report what happened
    pub async fn execute(&self, plan: &MutationPlan, options: &ExecuteOptions) -> ExecutionReport {
        let started_at = Utc::now();
        let mut outcomes: HashMap<OpId, Outcome> = HashMap::new();
        let mut pending: Vec<_> = plan.operations.iter().collect();
        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let created: Arc<CreatedIds> = Arc::new(Mutex::new(HashMap::new()));
        let mut in_flight: JoinSet<(OpId, u32, Result<ApplyOutput, RemoteError>)> = JoinSet::new();

        loop {
            // Dispatch pass: settle or spawn every operation whose
            // prerequisites are all terminal. Plan order guarantees a
            // prerequisite settled in this pass is seen by its
            // dependents in the same pass.
            let before = pending.len();
            let mut still_pending = Vec::with_capacity(pending.len());
            for op in pending {
                if !op.depends_on.iter().all(|dep| outcomes.contains_key(dep)) {
                    still_pending.push(op);
                    continue;
                }
                if options.cancel.is_cancelled() {
                    outcomes.insert(
                        op.id.clone(),
                        Outcome::Skipped {
                            reason: SkipReason::Cancelled,
                        },
                    );
                    continue;
                }
                if op
                    .depends_on
                    .iter()
                    .any(|dep| !outcomes[dep].is_applied())
                {
                    debug!(operation = %op.id, "skipping, prerequisite not applied");
                    outcomes.insert(
                        op.id.clone(),
                        Outcome::Skipped {
                            reason: SkipReason::PrerequisiteFailed,
                        },
                    );
                    continue;
                }
                if options.dry_run {
                    outcomes.insert(
                        op.id.clone(),
                        Outcome::Applied {
                            remote_id: None,
                            url: None,
                            simulated: true,
                        },
                    );
                    continue;
                }

                let client = Arc::clone(&self.client);
                let created = Arc::clone(&created);
                let semaphore = Arc::clone(&semaphore);
                let retry = options.retry.clone();
                let id = op.id.clone();
                let payload = op.payload.clone();
                in_flight.spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return (
                                id,
                                1,
                                Err(RemoteError::Unknown {
                                    message: "executor semaphore closed".to_string(),
                                }),
                            );
                        }
                    };
                    let (attempts, result) =
                        apply_with_retry(client.as_ref(), &payload, &created, &retry).await;
                    (id, attempts, result)
                });
            }
            let progressed = still_pending.len() != before;
            pending = still_pending;

            if pending.is_empty() && in_flight.is_empty() {
                break;
            }

            match in_flight.join_next().await {
                Some(Ok((id, attempts, result))) => {
                    let outcome = match result {
                        Ok(ApplyOutput::Created(remote_id)) => {
                            if let Ok(mut ids) = created.lock() {
                                ids.insert(id.clone(), remote_id.clone());
                            }
                            debug!(operation = %id, %remote_id, "applied");
                            Outcome::Applied {
                                remote_id: Some(remote_id),
                                url: None,
                                simulated: false,
                            }
                        }
                        Ok(ApplyOutput::Done) => {
                            debug!(operation = %id, "applied");
                            Outcome::Applied {
                                remote_id: None,
                                url: None,
                                simulated: false,
                            }
                        }
                        Ok(ApplyOutput::Webhook(url)) => {
                            debug!(operation = %id, url = %url, "applied");
                            Outcome::Applied {
                                remote_id: None,
                                url: Some(url),
                                simulated: false,
                            }
                        }
                        Err(error) => {
                            warn!(operation = %id, %error, attempts, "operation failed");
                            Outcome::Failed { error, attempts }
                        }
                    };
                    outcomes.insert(id, outcome);
                }
                Some(Err(join_error)) => {
                    // A panicking task loses its operation ID; the
                    // affected operation surfaces as skipped below.
                    warn!(%join_error, "operation task aborted");
                }
                None => {
                    if !progressed {
                        // Nothing in flight and nothing became ready.
                        warn!(stuck = pending.len(), "plan has unsatisfiable operations");
                        break;
                    }
                }
            }
        }

        let results = plan
            .operations
            .iter()
            .map(|op| OperationResult {
                id: op.id.clone(),
                kind: op.payload.kind(),
                outcome: outcomes.remove(&op.id).unwrap_or(Outcome::Skipped {
                    reason: SkipReason::PrerequisiteFailed,
                }),
            })
            .collect();

        ExecutionReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: options.dry_run,
            results,
        }
    }
}

async fn apply_with_retry(
    client: &dyn RemoteClient,
    payload: &OperationPayload,
    created: &CreatedIds,
    retry: &RetryConfig,
) -> (u32, Result<ApplyOutput, RemoteError>) {
    let mut attempts: u32 = 1;
    loop {
        match apply_once(client, payload, created).await {
            Ok(output) => return (attempts, Ok(output)),
            Err(error) => {
                let retries_done = attempts - 1;
                if !error.is_retryable() || retries_done >= retry.max_retries {
                    return (attempts, Err(error));
                }
                let mut delay = retry.delay_for(attempts);
                if let RemoteError::RateLimited {
                    retry_after_ms: Some(ms),
                } = &error
                {
                    delay = delay.max(Duration::from_millis(*ms));
                }
                warn!(%error, attempt = attempts, delay_ms = delay.as_millis() as u64, "retrying");
                sleep(delay).await;
                attempts += 1;
            }
        }
    }
}

async fn apply_once(
    client: &dyn RemoteClient,
    payload: &OperationPayload,
    created: &CreatedIds,
) -> Result<ApplyOutput, RemoteError> {
    match payload {
        OperationPayload::CreateRole { spec } => {
            client.create_role(spec).await.map(ApplyOutput::Created)
        }
        OperationPayload::UpdateRole { id, changes, .. } => {
            client.update_role(id, changes).await.map(|()| ApplyOutput::Done)
        }
        OperationPayload::CreateCategory { name, position } => client
            .create_category(name, *position)
            .await
            .map(ApplyOutput::Created),
        OperationPayload::CreateChannel { category, spec } => {
            let parent = resolve(category, OpId::category(&category.name), created)?;
            client
                .create_channel(spec, &parent)
                .await
                .map(ApplyOutput::Created)
        }
        OperationPayload::UpdateChannel { channel, changes } => {
            let id = resolve_channel(channel, created)?;
            client
                .update_channel(&id, changes)
                .await
                .map(|()| ApplyOutput::Done)
        }
        OperationPayload::SetPermissionOverwrite {
            channel,
            role,
            overwrite,
        } => {
            let channel_id = resolve_channel(channel, created)?;
            let role_id = resolve(role, OpId::role(&role.name), created)?;
            client
                .set_permission_overwrite(&channel_id, &role_id, overwrite)
                .await
                .map(|()| ApplyOutput::Done)
        }
        OperationPayload::ConfigureIntegration { kind, channel, .. } => {
            let channel_id = resolve_channel(channel, created)?;
            client
                .create_webhook(&channel_id, kind)
                .await
                .map(ApplyOutput::Webhook)
        }
    }
}

/// Resolve a reference either to its pre-existing remote ID or to the
/// ID assigned when the creating operation ran earlier in this pass
fn resolve(
    reference: &ResourceRef,
    creator: OpId,
    created: &CreatedIds,
) -> Result<RemoteId, RemoteError> {
    if let Some(id) = &reference.id {
        return Ok(id.clone());
    }
    created
        .lock()
        .map_err(|_| RemoteError::Unknown {
            message: "created-id map poisoned".to_string(),
        })?
        .get(&creator)
        .cloned()
        .ok_or_else(|| RemoteError::Unknown {
            message: format!("no created id for '{}' (from {creator})", reference.name),
        })
}

fn resolve_channel(reference: &ChannelRef, created: &CreatedIds) -> Result<RemoteId, RemoteError> {
    if let Some(id) = &reference.id {
        return Ok(id.clone());
    }
    let creator = OpId::channel(&reference.category, &reference.name);
    created
        .lock()
        .map_err(|_| RemoteError::Unknown {
            message: "created-id map poisoned".to_string(),
        })?
        .get(&creator)
        .cloned()
        .ok_or_else(|| RemoteError::Unknown {
            message: format!(
                "no created id for '{}/{}' (from {creator})",
                reference.category, reference.name
            ),
        })
}
