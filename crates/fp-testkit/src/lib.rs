//! # FP Testkit
//!
//! Deterministic stand-ins for every collaborator in `fp_core::effects`,
//! plus record fixtures and tracing setup for tests.
//!
//! Mocks are programmable (voting power, injected failures, delays) and
//! record what was called on them so tests can assert on interactions and
//! their order through a shared [`CallLog`].
//!
//! # Blocking Lock Usage
//!
//! All mocks keep their state behind `parking_lot::Mutex` and release it
//! before any `.await`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

pub mod chain;
pub mod fixtures;
pub mod instances;
pub mod keyring;
pub mod log;
pub mod signer;
pub mod store;

pub use chain::MockChainClient;
pub use fixtures::{signing_key, test_address, test_record, MockEnv};
pub use instances::MockInstanceManager;
pub use keyring::MockKeyring;
pub use log::CallLog;
pub use signer::MockSigner;
pub use store::FaultyStore;

/// Install a test-writer tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
