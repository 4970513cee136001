//! In-memory record store.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::RwLock` because:
//! 1. Every operation is a single map lookup, insert or clone
//! 2. The lock is never held across `.await` points
//! 3. Readers (list/get queries) never block each other

use async_trait::async_trait;
use fp_core::effects::{FinalityProviderStore, StoreError};
use fp_core::{BtcPublicKey, FinalityProviderRecord, FinalityProviderStatus};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Records held in a map ordered by public key.
#[derive(Debug, Default)]
pub struct MemoryFinalityProviderStore {
    records: RwLock<BTreeMap<BtcPublicKey, FinalityProviderRecord>>,
}

impl MemoryFinalityProviderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl FinalityProviderStore for MemoryFinalityProviderStore {
    async fn create(&self, record: FinalityProviderRecord) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let key = record.btc_public_key;
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        records.insert(key, record);
        tracing::debug!(btc_pk = %key, "stored finality provider");
        Ok(())
    }

    async fn get(&self, btc_pk: &BtcPublicKey) -> Result<FinalityProviderRecord, StoreError> {
        self.records
            .read()
            .get(btc_pk)
            .cloned()
            .ok_or(StoreError::NotFound(*btc_pk))
    }

    async fn list_all(&self) -> Result<Vec<FinalityProviderRecord>, StoreError> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn set_status(
        &self,
        btc_pk: &BtcPublicKey,
        status: FinalityProviderStatus,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(btc_pk)
            .ok_or(StoreError::NotFound(*btc_pk))?;
        record.status = status;
        Ok(())
    }
}
