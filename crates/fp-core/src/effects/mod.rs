//! Collaborator contracts consumed by the application actor.
//!
//! Each trait is the narrow interface to a subsystem the daemon core does not
//! own: the consumer chain, the EOTS signer, the chain keyring, the persisted
//! provider store, the voting-instance manager and the metrics sink. Runtime
//! code holds them as `Arc<dyn Trait>`; tests substitute the mocks from
//! `fp-testkit`.

pub mod chain;
pub mod instance;
pub mod keyring;
pub mod metrics;
pub mod signer;
pub mod store;

pub use chain::{ChainClient, ChainError, TxResponse};
pub use instance::{InstanceError, InstanceInfo, InstanceManager};
pub use keyring::{ChainKeyInfo, ChainKeyring, KeyringError};
pub use metrics::{MetricsSink, NoopMetrics};
pub use signer::{KeyRecord, SignerError, SignerService};
pub use store::{FinalityProviderStore, StoreError};
