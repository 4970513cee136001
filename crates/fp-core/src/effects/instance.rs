//! Voting-instance manager contract.

use crate::keys::BtcPublicKey;
use crate::status::FinalityProviderStatus;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the instance manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// Instance already running for this provider
    #[error("Finality provider instance already running: {0}")]
    AlreadyRunning(BtcPublicKey),

    /// No instance for this provider
    #[error("Finality provider instance not found: {0}")]
    NotFound(BtcPublicKey),

    /// Instance failed to start or stop
    #[error("Finality provider instance error: {0}")]
    Internal(String),
}

/// Snapshot of a running voting instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Provider the instance votes for
    pub btc_public_key: BtcPublicKey,
    /// Status the instance was started with
    pub status: FinalityProviderStatus,
    /// Whether the instance loop is running
    pub running: bool,
}

/// Owner of the per-provider voting instances.
#[async_trait]
pub trait InstanceManager: Send + Sync {
    /// Start the voting instance for one provider.
    async fn start(&self, btc_pk: &BtcPublicKey, passphrase: &str) -> Result<(), InstanceError>;

    /// Start instances for every eligible stored provider.
    async fn start_all(&self) -> Result<(), InstanceError>;

    /// Stop every running instance.
    async fn stop(&self) -> Result<(), InstanceError>;

    /// Whether an instance is running for this provider.
    fn is_running(&self, btc_pk: &BtcPublicKey) -> bool;

    /// All managed instances.
    fn list(&self) -> Vec<InstanceInfo>;

    /// Instance for one provider.
    fn info(&self, btc_pk: &BtcPublicKey) -> Result<InstanceInfo, InstanceError>;
}
