//! Creation and registration through the running actor, plus the read side.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use assert_matches::assert_matches;
use common::{build, params, quiet_config};
use fp_app::AppError;
use fp_core::effects::{ChainError, ChainKeyring, FinalityProviderStore, SignerError, StoreError};
use fp_core::{BtcPublicKey, Decimal, Description, FinalityProviderStatus};
use fp_testkit::{signing_key, test_record};
use k256::ecdsa::signature::Verifier;

#[tokio::test]
async fn test_create_stores_one_created_record_with_valid_pop() {
    let (app, env, _metrics) = build(quiet_config());
    app.start().await.unwrap();

    let info = app.create_finality_provider(params("alice")).await.unwrap();
    assert_eq!(info.status, "CREATED");
    assert_eq!(info.commission, "0.05");
    assert_eq!(info.description.moniker, "alice");

    assert_eq!(env.records.len(), 1);
    let btc_pk = BtcPublicKey::from_hex(&info.btc_pk_hex).unwrap();
    let record = env.records.get(&btc_pk).await.unwrap();
    assert_eq!(record.status, FinalityProviderStatus::Created);
    assert_eq!(record.chain_id, "test-1");
    assert_eq!(record.key_name, "alice");
    assert_eq!(record.address.to_string(), info.address);
    assert!(!record.proof_of_possession.btc_sig.is_empty());
    record
        .proof_of_possession
        .verify(&record.address, &record.btc_public_key)
        .unwrap();

    assert_eq!(env.signer.key_for("alice"), Some(btc_pk));
    assert_eq!(
        env.keyring.address("alice", "").await.unwrap(),
        record.address
    );
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_create_with_existing_btc_key() {
    let (app, env, _metrics) = build(quiet_config());
    let btc_pk = env.signer.import_key("bob", "secret", &signing_key(9));
    app.start().await.unwrap();

    let info = app
        .create_finality_provider(
            params("bob")
                .with_passphrase("secret")
                .with_btc_public_key(btc_pk),
        )
        .await
        .unwrap();

    assert_eq!(info.btc_pk_hex, btc_pk.to_hex());
    assert_eq!(env.signer.key_count(), 1);
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_create_with_unknown_btc_key_stores_nothing() {
    let (app, env, _metrics) = build(quiet_config());
    let unknown = BtcPublicKey::from_verifying_key(signing_key(10).verifying_key());
    app.start().await.unwrap();

    let err = app
        .create_finality_provider(params("carol").with_btc_public_key(unknown))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Signer(SignerError::KeyNotFound(_)));
    assert!(env.records.is_empty());
    // The chain key from step one is not rolled back.
    assert_eq!(env.keyring.len(), 1);
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_creation_hits_store_uniqueness() {
    let (app, env, _metrics) = build(quiet_config());
    app.start().await.unwrap();

    app.create_finality_provider(params("alice")).await.unwrap();
    let err = app.create_finality_provider(params("alice")).await.unwrap_err();
    assert_matches!(err, AppError::Store(StoreError::AlreadyExists(_)));
    assert_eq!(env.records.len(), 1);
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_creations_are_all_served() {
    let (app, env, _metrics) = build(quiet_config());
    app.start().await.unwrap();

    let names = ["p0", "p1", "p2", "p3", "p4", "p5"];
    let calls = names.iter().map(|name| {
        let app = app.clone();
        async move { app.create_finality_provider(params(name)).await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(env.records.len(), names.len());
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_failed_registration_then_retry() {
    let (app, env, metrics) = build(quiet_config());
    app.start().await.unwrap();
    let info = app.create_finality_provider(params("alice")).await.unwrap();
    let btc_pk = BtcPublicKey::from_hex(&info.btc_pk_hex).unwrap();

    env.chain
        .fail_next_registration(ChainError::tx_failed("insufficient fees"));
    let err = app
        .register_finality_provider(&info.btc_pk_hex)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Chain(ChainError::TxFailed(_)));
    assert_eq!(env.status_of(&btc_pk).await, FinalityProviderStatus::Created);

    let res = app
        .register_finality_provider(&info.btc_pk_hex)
        .await
        .unwrap();
    let txs = env.chain.registrations();
    assert_eq!(txs.len(), 1);
    assert_eq!(res.tx_hash, txs[0].tx_hash);
    assert_eq!(res.btc_public_key, btc_pk);
    assert_eq!(res.chain_address.to_string(), info.address);
    assert_eq!(txs[0].commission, Decimal::new(5, 2));
    assert!(!txs[0].pop.is_empty());

    assert_eq!(env.status_of(&btc_pk).await, FinalityProviderStatus::Registered);
    assert_eq!(
        metrics.status(&info.btc_pk_hex),
        Some(FinalityProviderStatus::Registered)
    );
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_registering_twice_is_rejected_without_mutation() {
    let (app, env, _metrics) = build(quiet_config());
    let record = test_record(4, FinalityProviderStatus::Registered);
    env.seed(record.clone()).await;
    app.start().await.unwrap();

    let err = app
        .register_finality_provider(&record.btc_public_key.to_hex())
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppError::AlreadyRegistered { status: FinalityProviderStatus::Registered, .. }
    );
    assert!(err.to_string().contains("already registered"));
    assert_eq!(env.chain.registration_attempts(), 0);
    assert_eq!(
        env.status_of(&record.btc_public_key).await,
        FinalityProviderStatus::Registered
    );
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (app, _env, _metrics) = build(quiet_config());
    app.start().await.unwrap();

    assert_matches!(
        app.register_finality_provider("not-hex").await,
        Err(AppError::InvalidPublicKey(_))
    );
    let unknown = BtcPublicKey::from_verifying_key(signing_key(11).verifying_key());
    assert_matches!(
        app.register_finality_provider(&unknown.to_hex()).await,
        Err(AppError::Store(StoreError::NotFound(_)))
    );
    app.stop().await.unwrap();
}

#[tokio::test]
async fn test_sign_raw_message_creates_key_on_demand() {
    let (app, env, _metrics) = build(quiet_config());
    assert!(env.keyring.is_empty());

    let sig = app
        .sign_raw_message("signer", "pw", "m/44'/0'", b"payload")
        .await
        .unwrap();
    assert_eq!(env.keyring.len(), 1);

    let sig = k256::ecdsa::Signature::from_slice(&sig).unwrap();
    env.keyring
        .verifying_key("signer")
        .unwrap()
        .verify(b"payload", &sig)
        .unwrap();

    // Second call reuses the key.
    app.sign_raw_message("signer", "pw", "m/44'/0'", b"again")
        .await
        .unwrap();
    assert_eq!(env.keyring.len(), 1);
}

#[tokio::test]
async fn test_read_side_queries() {
    let (app, env, _metrics) = build(quiet_config());
    let created = test_record(5, FinalityProviderStatus::Created);
    let registered = test_record(6, FinalityProviderStatus::Registered);
    env.seed(created.clone()).await;
    env.seed(registered.clone()).await;

    let infos = app.list_all_finality_providers_info().await.unwrap();
    assert_eq!(infos.len(), 2);

    let info = app
        .finality_provider_info(&registered.btc_public_key)
        .await
        .unwrap();
    assert_eq!(info, registered.to_info());
    assert_eq!(info.status, "REGISTERED");

    app.start_handling_all().await.unwrap();
    let instances = app.list_finality_provider_instances();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].btc_public_key, registered.btc_public_key);
    assert_eq!(instances[0].status, FinalityProviderStatus::Registered);

    app.start_handling_finality_provider(&created.btc_public_key, "pw")
        .await
        .unwrap();
    assert_eq!(app.list_finality_provider_instances().len(), 2);
    assert_matches!(
        app.start_handling_finality_provider(&created.btc_public_key, "pw")
            .await,
        Err(AppError::Instance(_))
    );
}

#[tokio::test]
async fn test_description_bytes_reach_the_chain() {
    let (app, env, _metrics) = build(quiet_config());
    app.start().await.unwrap();

    let mut description = Description::with_moniker("dave");
    description.website = "https://dave.example".to_string();
    let mut p = params("dave");
    p.description = description.clone();
    let info = app.create_finality_provider(p).await.unwrap();
    app.register_finality_provider(&info.btc_pk_hex).await.unwrap();

    let txs = env.chain.registrations();
    assert_eq!(txs[0].description, description.to_bytes().unwrap());
    app.stop().await.unwrap();
}
