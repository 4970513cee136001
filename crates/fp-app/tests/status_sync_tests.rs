//! Status reconciliation against voting power, and the periodic loops.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use assert_matches::assert_matches;
use common::{build, quiet_config};
use fp_app::{AppConfig, AppError};
use fp_core::effects::{ChainError, InstanceError};
use fp_core::FinalityProviderStatus;
use fp_testkit::test_record;
use std::time::Duration;

#[tokio::test]
async fn test_created_without_voting_power_becomes_registered_and_starts() {
    let (app, env, metrics) = build(quiet_config());
    let record = test_record(1, FinalityProviderStatus::Created);
    env.seed(record.clone()).await;

    assert!(app.sync_status().await.unwrap());

    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
    assert_eq!(
        env.instances.starts(),
        vec![(record.btc_public_key, String::new())]
    );
    assert_eq!(
        metrics.status(&record.btc_public_key.to_hex()),
        Some(FinalityProviderStatus::Registered)
    );
}

#[tokio::test]
async fn test_active_without_voting_power_becomes_inactive() {
    let (app, env, _metrics) = build(quiet_config());
    let record = test_record(2, FinalityProviderStatus::Active);
    env.seed(record.clone()).await;
    env.chain.set_voting_power(record.btc_public_key, 0);

    assert!(app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Inactive
    );
    assert_eq!(env.instances.running_count(), 1);
}

#[tokio::test]
async fn test_one_pass_moves_created_and_active_providers() {
    let (app, env, _metrics) = build(quiet_config());
    let created = test_record(15, FinalityProviderStatus::Created);
    let active = test_record(16, FinalityProviderStatus::Active);
    env.seed(created.clone()).await;
    env.seed(active.clone()).await;
    env.chain.set_voting_power(created.btc_public_key, 0);
    env.chain.set_voting_power(active.btc_public_key, 0);

    assert!(app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&created.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
    assert_eq!(
        env.status_of(&active.btc_public_key).await,
        FinalityProviderStatus::Inactive
    );
    assert_eq!(env.instances.running_count(), 2);
}

#[tokio::test]
async fn test_instance_started_concurrently_does_not_abort_the_pass() {
    let (app, env, _metrics) = build(quiet_config());
    let raced = test_record(17, FinalityProviderStatus::Created);
    env.seed(raced.clone()).await;
    env.instances
        .fail_next_start(InstanceError::AlreadyRunning(raced.btc_public_key));

    assert!(app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&raced.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
}

#[tokio::test]
async fn test_voting_power_activates_registered_and_inactive() {
    let (app, env, _metrics) = build(quiet_config());
    let registered = test_record(3, FinalityProviderStatus::Registered);
    let inactive = test_record(4, FinalityProviderStatus::Inactive);
    env.seed(registered.clone()).await;
    env.seed(inactive.clone()).await;
    env.chain.set_voting_power(registered.btc_public_key, 100);
    env.chain.set_voting_power(inactive.btc_public_key, 1);

    assert!(app.sync_status().await.unwrap());
    for pk in [registered.btc_public_key, inactive.btc_public_key] {
        assert_eq!(env.status_of(&pk).await, FinalityProviderStatus::Active);
    }
    assert_eq!(env.instances.running_count(), 2);
}

#[tokio::test]
async fn test_registered_without_voting_power_is_left_alone() {
    let (app, env, _metrics) = build(quiet_config());
    let record = test_record(5, FinalityProviderStatus::Registered);
    env.seed(record.clone()).await;

    assert!(!app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
    assert_eq!(env.instances.running_count(), 0);
}

#[tokio::test]
async fn test_slashed_is_never_synced() {
    let (app, env, _metrics) = build(quiet_config());
    let record = test_record(6, FinalityProviderStatus::Slashed);
    env.seed(record.clone()).await;
    env.chain.set_voting_power(record.btc_public_key, 50);

    assert!(!app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Slashed
    );
    assert_eq!(env.instances.running_count(), 0);
}

#[tokio::test]
async fn test_voting_power_errors_skip_the_record() {
    let (app, env, _metrics) = build(quiet_config());
    let failing = test_record(7, FinalityProviderStatus::Created);
    let healthy = test_record(8, FinalityProviderStatus::Created);
    env.seed(failing.clone()).await;
    env.seed(healthy.clone()).await;
    env.chain
        .set_voting_power_error(failing.btc_public_key, ChainError::rpc("timeout"));

    assert!(app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&failing.btc_public_key).await,
        FinalityProviderStatus::Created
    );
    assert_eq!(
        env.status_of(&healthy.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
}

#[tokio::test]
async fn test_running_instance_is_not_touched() {
    let (app, env, _metrics) = build(quiet_config());
    let record = test_record(9, FinalityProviderStatus::Active);
    env.seed(record.clone()).await;
    env.chain.set_voting_power(record.btc_public_key, 0);
    app.start_handling_finality_provider(&record.btc_public_key, "pw")
        .await
        .unwrap();

    assert!(app.sync_status().await.unwrap());
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Active
    );
    assert_eq!(env.instances.starts().len(), 1);
}

#[tokio::test]
async fn test_chain_and_store_failures_abort_the_pass() {
    let (app, env, _metrics) = build(quiet_config());
    env.seed(test_record(10, FinalityProviderStatus::Created)).await;

    env.chain.set_best_height_error(Some(ChainError::rpc("no peers")));
    assert_matches!(
        app.sync_status().await,
        Err(AppError::Chain(ChainError::Rpc(_)))
    );
    env.chain.set_best_height_error(None);

    env.store.fail_set_status(true);
    assert_matches!(app.sync_status().await, Err(AppError::Store(_)));
    assert_eq!(env.instances.running_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sync_loop_stops_once_an_instance_runs() {
    let (app, env, _metrics) = build(AppConfig::for_testing());
    let record = test_record(11, FinalityProviderStatus::Created);
    env.seed(record.clone()).await;
    app.start().await.unwrap();

    // First tick fires one full interval after start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(env.chain.height_queries(), 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
    let queries = env.chain.height_queries();
    assert_eq!(queries, 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(env.chain.height_queries(), queries);
    assert_eq!(env.instances.starts().len(), 1);
    app.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_sync_loop_keeps_ticking_without_instances() {
    let (app, env, _metrics) = build(AppConfig::for_testing());
    app.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(520)).await;
    assert!(env.chain.height_queries() >= 9);
    app.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_metrics_loop_exports_snapshots() {
    let (app, env, metrics) = build(AppConfig::for_testing());
    let record = test_record(12, FinalityProviderStatus::Registered);
    env.seed(record.clone()).await;
    app.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(110)).await;
    assert!(metrics.snapshot_count() >= 4);
    assert_eq!(
        metrics.status(&record.btc_public_key.to_hex()),
        Some(FinalityProviderStatus::Registered)
    );
    assert_eq!(metrics.last_voted_height(&record.btc_public_key.to_hex()), Some(0));

    env.store.fail_list_all(true);
    let before = metrics.snapshot_count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(metrics.snapshot_count(), before);
    app.stop().await.unwrap();
}
