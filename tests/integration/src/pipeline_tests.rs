//! End-to-end pipeline tests
//!
//! Exercise the complete flow: config loading -> diff -> plan ->
//! execution against an in-memory server -> re-diff, across the
//! scenarios an operator actually runs into.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use guild_client::memory::InMemoryGuild;
use guild_client::{RemoteClient, RemoteError, fetch_snapshot};
use guild_config::{GuildConfig, desired_from_snapshot, export_backup, load_snapshot, save_snapshot};
use guild_engine::{ExecuteOptions, Executor, OpId, Outcome, RetryConfig, SkipReason, diff, plan};
use guild_model::{ChannelKind, Color};
use guild_test_utils::config::TestConfigDir;
use guild_test_utils::fixtures;

fn fast_options() -> ExecuteOptions {
    ExecuteOptions {
        retry: RetryConfig {
            initial_backoff_ms: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn apply(guild: &Arc<InMemoryGuild>, desired: &guild_model::DesiredState) {
    let remote = fetch_snapshot(guild.as_ref()).await.unwrap();
    let outcome = plan(desired, &remote).unwrap();
    let executor = Executor::new(Arc::clone(guild) as Arc<dyn RemoteClient>);
    let report = executor.execute(&outcome.plan, &fast_options()).await;
    assert!(report.is_success(), "report: {report:?}");
}

#[tokio::test]
async fn fresh_setup_converges_and_stays_converged() {
    let guild = Arc::new(InMemoryGuild::new());
    let desired = fixtures::project_server();

    apply(&guild, &desired).await;

    let snapshot = guild.snapshot();
    assert!(snapshot.role("Mod").is_some());
    assert!(snapshot.channel("Info", "announcements").is_some());
    assert_eq!(snapshot.integration("github").unwrap().channel, "general");

    // A second pass over the converged server plans nothing.
    let delta = diff(&desired, &snapshot).unwrap();
    assert!(delta.is_empty(), "delta: {delta:?}");

    let mutations_before = guild.mutation_log().len();
    apply(&guild, &desired).await;
    assert_eq!(guild.mutation_log().len(), mutations_before);
}

#[tokio::test]
async fn drift_repair_touches_only_drifted_resources() {
    let mut seeded = fixtures::project_snapshot();
    // Drift: recolor a role and drop a channel.
    seeded.roles[1].color = Color(0x000000);
    seeded.categories[0].channels.retain(|c| c.name != "general");
    // The webhook is gone too; it must be recreated on the new channel.
    seeded.integrations.clear();
    let guild = Arc::new(InMemoryGuild::seeded(seeded));
    let desired = fixtures::project_server();

    let remote = fetch_snapshot(guild.as_ref()).await.unwrap();
    let outcome = plan(&desired, &remote).unwrap();
    let ids: Vec<_> = outcome
        .plan
        .operations
        .iter()
        .map(|op| op.id.as_str().to_string())
        .collect();
    assert_eq!(
        ids,
        vec!["role/Mod", "channel/Info/general", "integration/github"]
    );

    let executor = Executor::new(Arc::clone(&guild) as Arc<dyn RemoteClient>);
    let report = executor.execute(&outcome.plan, &fast_options()).await;
    assert!(report.is_success(), "report: {report:?}");

    let delta = diff(&desired, &guild.snapshot()).unwrap();
    assert!(delta.is_empty(), "delta: {delta:?}");
}

#[tokio::test]
async fn converged_server_plans_nothing() {
    let desired = fixtures::project_server();
    let outcome = plan(&desired, &fixtures::project_snapshot()).unwrap();
    assert!(outcome.is_noop(), "outcome: {outcome:?}");
}

#[tokio::test]
async fn partial_failure_leaves_independent_branches_applied() {
    let guild = Arc::new(InMemoryGuild::new());
    guild.fail_with(
        "create_channel:announcements",
        RemoteError::Forbidden {
            action: "create_channel".to_string(),
        },
    );
    let desired = fixtures::project_server();

    let remote = fetch_snapshot(guild.as_ref()).await.unwrap();
    let outcome = plan(&desired, &remote).unwrap();
    let executor = Executor::new(Arc::clone(&guild) as Arc<dyn RemoteClient>);
    let report = executor.execute(&outcome.plan, &fast_options()).await;

    assert_eq!(report.failed(), 1);
    // Both overwrites on the failed channel are skipped.
    assert_eq!(
        report.outcome_of(&OpId::overwrite("Info", "announcements", "Mod")),
        Some(&Outcome::Skipped {
            reason: SkipReason::PrerequisiteFailed
        })
    );
    assert_eq!(
        report.outcome_of(&OpId::overwrite("Info", "announcements", "@everyone")),
        Some(&Outcome::Skipped {
            reason: SkipReason::PrerequisiteFailed
        })
    );
    // Everything else landed.
    let snapshot = guild.snapshot();
    assert!(snapshot.role("Mod").is_some());
    assert!(snapshot.channel("Info", "general").is_some());
    assert!(snapshot.integration("github").is_some());

    // Re-running after the permission problem is fixed converges.
    let guild_fixed = guild;
    {
        let remote = fetch_snapshot(guild_fixed.as_ref()).await.unwrap();
        let outcome = plan(&desired, &remote).unwrap();
        // Only the failed channel and its overwrites remain.
        assert_eq!(outcome.plan.len(), 3);
        let executor = Executor::new(Arc::clone(&guild_fixed) as Arc<dyn RemoteClient>);
        let report = executor.execute(&outcome.plan, &fast_options()).await;
        assert!(report.is_success(), "report: {report:?}");
    }
    let delta = diff(&desired, &guild_fixed.snapshot()).unwrap();
    assert!(delta.is_empty());
}

#[tokio::test]
async fn dry_run_plans_everything_and_changes_nothing() {
    let guild = Arc::new(InMemoryGuild::new());
    let config_dir = TestConfigDir::new();
    config_dir.write_desired(&fixtures::project_server());
    let config = GuildConfig::load(config_dir.root()).unwrap();

    let remote = fetch_snapshot(guild.as_ref()).await.unwrap();
    let outcome = plan(&config.desired, &remote).unwrap();
    let executor = Executor::new(Arc::clone(&guild) as Arc<dyn RemoteClient>);
    let options = ExecuteOptions {
        dry_run: true,
        ..fast_options()
    };
    let report = executor.execute(&outcome.plan, &options).await;

    assert!(report.is_success());
    assert!(report.dry_run);
    assert!(guild.mutation_log().is_empty());
    assert_eq!(guild.snapshot(), InMemoryGuild::new().snapshot());
}

#[tokio::test]
async fn kind_conflict_freezes_the_channel_but_nothing_else() {
    let mut seeded = fixtures::project_snapshot();
    let general = seeded.categories[0]
        .channels
        .iter_mut()
        .find(|c| c.name == "general")
        .unwrap();
    general.kind = ChannelKind::Voice;
    // Make another resource drift so the plan is non-empty.
    seeded.roles[1].hoist = true;

    let desired = fixtures::project_server();
    let outcome = plan(&desired, &seeded).unwrap();

    assert_eq!(outcome.kind_conflicts.len(), 1);
    assert_eq!(outcome.kind_conflicts[0].channel, "general");
    assert_eq!(
        outcome
            .plan
            .operations
            .iter()
            .map(|op| op.id.as_str())
            .collect::<Vec<_>>(),
        vec!["role/Mod"]
    );
}

#[tokio::test]
async fn backup_of_a_live_server_recreates_it_elsewhere() {
    // Converge a server, export its state, and rebuild a second server
    // from the backup alone.
    let original = Arc::new(InMemoryGuild::new());
    apply(&original, &fixtures::project_server()).await;

    let backups = tempfile::TempDir::new().unwrap();
    let backup_dir = export_backup(backups.path(), &original.snapshot()).unwrap();
    let restored_config = GuildConfig::load(&backup_dir).unwrap();
    assert_eq!(
        restored_config.desired,
        desired_from_snapshot(&original.snapshot())
    );

    let replica = Arc::new(InMemoryGuild::new());
    apply(&replica, &restored_config.desired).await;

    let delta = diff(&restored_config.desired, &replica.snapshot()).unwrap();
    assert!(delta.is_empty(), "delta: {delta:?}");
}

#[tokio::test]
async fn snapshot_files_round_trip_through_the_pipeline() {
    let guild = Arc::new(InMemoryGuild::new());
    let desired = fixtures::project_server();
    apply(&guild, &desired).await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.yaml");
    save_snapshot(&path, &guild.snapshot()).unwrap();

    let reloaded = load_snapshot(&path).unwrap();
    assert_eq!(reloaded, guild.snapshot());
    assert!(plan(&desired, &reloaded).unwrap().is_noop());
}
