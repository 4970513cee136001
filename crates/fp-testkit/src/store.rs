//! Store wrapper with injectable write and read failures.

use async_trait::async_trait;
use fp_core::effects::{FinalityProviderStore, StoreError};
use fp_core::{BtcPublicKey, FinalityProviderRecord, FinalityProviderStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Delegates to an inner store unless a failure is switched on.
pub struct FaultyStore {
    inner: Arc<dyn FinalityProviderStore>,
    fail_set_status: AtomicBool,
    fail_list_all: AtomicBool,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn FinalityProviderStore>) -> Self {
        Self {
            inner,
            fail_set_status: AtomicBool::new(false),
            fail_list_all: AtomicBool::new(false),
        }
    }

    /// Make every status write fail.
    pub fn fail_set_status(&self, fail: bool) {
        self.fail_set_status.store(fail, Ordering::SeqCst);
    }

    /// Make every full listing fail.
    pub fn fail_list_all(&self, fail: bool) {
        self.fail_list_all.store(fail, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for FaultyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyStore")
            .field("fail_set_status", &self.fail_set_status)
            .field("fail_list_all", &self.fail_list_all)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FinalityProviderStore for FaultyStore {
    async fn create(&self, record: FinalityProviderRecord) -> Result<(), StoreError> {
        self.inner.create(record).await
    }

    async fn get(&self, btc_pk: &BtcPublicKey) -> Result<FinalityProviderRecord, StoreError> {
        self.inner.get(btc_pk).await
    }

    async fn list_all(&self) -> Result<Vec<FinalityProviderRecord>, StoreError> {
        if self.fail_list_all.load(Ordering::SeqCst) {
            return Err(StoreError::io("injected list failure"));
        }
        self.inner.list_all().await
    }

    async fn set_status(
        &self,
        btc_pk: &BtcPublicKey,
        status: FinalityProviderStatus,
    ) -> Result<(), StoreError> {
        if self.fail_set_status.load(Ordering::SeqCst) {
            return Err(StoreError::io("injected write failure"));
        }
        self.inner.set_status(btc_pk, status).await
    }
}
