//! Shared wiring for the application actor integration tests.

#![allow(dead_code)]

use fp_app::{AppConfig, Collaborators, CreateFinalityProviderParams, FinalityProviderApp, FpMetrics};
use fp_core::{Decimal, Description};
use fp_testkit::MockEnv;
use std::sync::Arc;

/// Intervals long enough that no periodic loop fires during a test.
pub fn quiet_config() -> AppConfig {
    let mut config = AppConfig::for_testing();
    config.sync_status_interval_ms = 3_600_000;
    config.metrics.update_interval_ms = 3_600_000;
    config
}

pub fn collaborators(env: &MockEnv, metrics: Arc<FpMetrics>) -> Collaborators {
    Collaborators::new(
        env.chain.clone(),
        env.signer.clone(),
        env.keyring.clone(),
        env.store.clone(),
        env.instances.clone(),
    )
    .with_metrics(metrics)
}

/// App over fresh mocks, plus the mocks and its metrics.
pub fn build(config: AppConfig) -> (FinalityProviderApp, MockEnv, Arc<FpMetrics>) {
    fp_testkit::init_test_tracing();
    let env = MockEnv::new();
    let metrics = Arc::new(FpMetrics::new().expect("metrics registry"));
    let app = FinalityProviderApp::new(config, collaborators(&env, metrics.clone()))
        .expect("valid config");
    (app, env, metrics)
}

pub fn params(key_name: &str) -> CreateFinalityProviderParams {
    CreateFinalityProviderParams::new(
        key_name,
        "test-1",
        Description::with_moniker(key_name),
        Decimal::new(5, 2),
    )
}
