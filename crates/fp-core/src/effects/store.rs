//! Persisted finality provider store contract.

use crate::keys::BtcPublicKey;
use crate::record::FinalityProviderRecord;
use crate::status::FinalityProviderStatus;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the provider store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record already exists for this key
    #[error("Finality provider already exists: {0}")]
    AlreadyExists(BtcPublicKey),

    /// No record for this key
    #[error("Finality provider not found: {0}")]
    NotFound(BtcPublicKey),

    /// Backend read or write failure
    #[error("Store I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Create an I/O error
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

/// Records keyed by BTC public key.
///
/// Every write is single-record and atomic: it either fully lands or not at
/// all.
#[async_trait]
pub trait FinalityProviderStore: Send + Sync {
    /// Insert a new record; fails with [`StoreError::AlreadyExists`] on a duplicate key.
    async fn create(&self, record: FinalityProviderRecord) -> Result<(), StoreError>;

    /// Record for one key.
    async fn get(&self, btc_pk: &BtcPublicKey) -> Result<FinalityProviderRecord, StoreError>;

    /// Every stored record.
    async fn list_all(&self) -> Result<Vec<FinalityProviderRecord>, StoreError>;

    /// Overwrite the status of one record.
    async fn set_status(
        &self,
        btc_pk: &BtcPublicKey,
        status: FinalityProviderStatus,
    ) -> Result<(), StoreError>;

    /// Apply the voting-power transition to `record` and persist it when it changes.
    ///
    /// Returns the resulting status.
    async fn update_status_from_voting_power(
        &self,
        voting_power: u64,
        record: &FinalityProviderRecord,
    ) -> Result<FinalityProviderStatus, StoreError> {
        let next = record.status.reconcile(voting_power);
        if next != record.status {
            self.set_status(&record.btc_public_key, next).await?;
        }
        Ok(next)
    }
}
