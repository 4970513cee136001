//! Voting instance manager that only tracks what it was asked to run.

use crate::log::CallLog;
use async_trait::async_trait;
use fp_core::effects::{FinalityProviderStore, InstanceError, InstanceInfo, InstanceManager};
use fp_core::{BtcPublicKey, FinalityProviderStatus};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct InstanceState {
    running: BTreeMap<BtcPublicKey, InstanceInfo>,
    starts: Vec<(BtcPublicKey, String)>,
    fail_start: Option<InstanceError>,
}

/// Instance manager with no voting behind it.
///
/// When given a store, started instances report the stored status and
/// `start_all` starts every provider whose status allows it.
pub struct MockInstanceManager {
    state: Mutex<InstanceState>,
    store: Option<Arc<dyn FinalityProviderStore>>,
    log: CallLog,
}

impl MockInstanceManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            store: None,
            log: CallLog::new(),
        }
    }

    /// Manager reading provider statuses from `store`.
    pub fn with_store(store: Arc<dyn FinalityProviderStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new()
        }
    }

    /// Record calls into `log`.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// Fail the next `start` with `err`.
    pub fn fail_next_start(&self, err: InstanceError) {
        self.state.lock().fail_start = Some(err);
    }

    /// Every successful `start`, with the passphrase it was given.
    pub fn starts(&self) -> Vec<(BtcPublicKey, String)> {
        self.state.lock().starts.clone()
    }

    pub fn running_count(&self) -> usize {
        self.state.lock().running.len()
    }

    async fn status_of(&self, btc_pk: &BtcPublicKey) -> FinalityProviderStatus {
        match &self.store {
            Some(store) => store
                .get(btc_pk)
                .await
                .map(|r| r.status)
                .unwrap_or(FinalityProviderStatus::Registered),
            None => FinalityProviderStatus::Registered,
        }
    }
}

impl Default for MockInstanceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockInstanceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockInstanceManager")
            .field("running", &self.running_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InstanceManager for MockInstanceManager {
    async fn start(&self, btc_pk: &BtcPublicKey, passphrase: &str) -> Result<(), InstanceError> {
        self.log.record(format!("instances.start {btc_pk}"));
        let status = self.status_of(btc_pk).await;

        let mut state = self.state.lock();
        if let Some(err) = state.fail_start.take() {
            return Err(err);
        }
        if state.running.contains_key(btc_pk) {
            return Err(InstanceError::AlreadyRunning(*btc_pk));
        }
        state.running.insert(
            *btc_pk,
            InstanceInfo {
                btc_public_key: *btc_pk,
                status,
                running: true,
            },
        );
        state.starts.push((*btc_pk, passphrase.to_string()));
        Ok(())
    }

    async fn start_all(&self) -> Result<(), InstanceError> {
        self.log.record("instances.start_all");
        let Some(store) = &self.store else {
            return Ok(());
        };
        let records = store
            .list_all()
            .await
            .map_err(|e| InstanceError::Internal(e.to_string()))?;
        for record in records.iter().filter(|r| r.should_start()) {
            if !self.is_running(&record.btc_public_key) {
                self.start(&record.btc_public_key, "").await?;
            }
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), InstanceError> {
        self.log.record("instances.stop");
        self.state.lock().running.clear();
        Ok(())
    }

    fn is_running(&self, btc_pk: &BtcPublicKey) -> bool {
        self.state.lock().running.contains_key(btc_pk)
    }

    fn list(&self) -> Vec<InstanceInfo> {
        self.state.lock().running.values().cloned().collect()
    }

    fn info(&self, btc_pk: &BtcPublicKey) -> Result<InstanceInfo, InstanceError> {
        self.state
            .lock()
            .running
            .get(btc_pk)
            .cloned()
            .ok_or(InstanceError::NotFound(*btc_pk))
    }
}
