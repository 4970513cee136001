//! Programmable consumer chain.

use crate::log::CallLog;
use async_trait::async_trait;
use fp_core::effects::{ChainClient, ChainError, TxResponse};
use fp_core::{BtcPublicKey, Decimal};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// A registration transaction the chain accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationTx {
    pub btc_pk: BtcPublicKey,
    pub pop: Vec<u8>,
    pub commission: Decimal,
    pub description: Vec<u8>,
    pub tx_hash: String,
}

#[derive(Debug)]
struct ChainState {
    best_height: u64,
    best_height_error: Option<ChainError>,
    voting_power: BTreeMap<BtcPublicKey, u64>,
    voting_power_errors: BTreeMap<BtcPublicKey, ChainError>,
    registration_failures: VecDeque<ChainError>,
    registration_delay: Option<Duration>,
    registrations: Vec<RegistrationTx>,
}

/// Chain whose heights, voting power and transaction outcomes are set by the test.
///
/// Providers without an explicit voting power answer with
/// [`ChainError::VotingPowerTableNotUpdated`], as a fresh chain does.
#[derive(Debug)]
pub struct MockChainClient {
    state: Mutex<ChainState>,
    log: CallLog,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::with_log(CallLog::new())
    }

    /// Chain recording its calls into `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            state: Mutex::new(ChainState {
                best_height: 1,
                best_height_error: None,
                voting_power: BTreeMap::new(),
                voting_power_errors: BTreeMap::new(),
                registration_failures: VecDeque::new(),
                registration_delay: None,
                registrations: Vec::new(),
            }),
            log,
        }
    }

    pub fn set_best_height(&self, height: u64) {
        self.state.lock().best_height = height;
    }

    /// Make `best_block_height` fail until cleared with `None`.
    pub fn set_best_height_error(&self, err: Option<ChainError>) {
        self.state.lock().best_height_error = err;
    }

    pub fn set_voting_power(&self, btc_pk: BtcPublicKey, voting_power: u64) {
        let mut state = self.state.lock();
        state.voting_power_errors.remove(&btc_pk);
        state.voting_power.insert(btc_pk, voting_power);
    }

    /// Make voting power queries for `btc_pk` fail with `err`.
    pub fn set_voting_power_error(&self, btc_pk: BtcPublicKey, err: ChainError) {
        self.state.lock().voting_power_errors.insert(btc_pk, err);
    }

    /// Fail the next registration transaction with `err`.
    pub fn fail_next_registration(&self, err: ChainError) {
        self.state.lock().registration_failures.push_back(err);
    }

    /// Delay every registration transaction.
    pub fn set_registration_delay(&self, delay: Duration) {
        self.state.lock().registration_delay = Some(delay);
    }

    /// Accepted registration transactions, oldest first.
    pub fn registrations(&self) -> Vec<RegistrationTx> {
        self.state.lock().registrations.clone()
    }

    /// Number of best block height queries so far.
    pub fn height_queries(&self) -> usize {
        self.log.matching("chain.best_block_height").len()
    }

    /// Number of registration attempts, including failed ones.
    pub fn registration_attempts(&self) -> usize {
        self.log.matching("chain.register").len()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn best_block_height(&self) -> Result<u64, ChainError> {
        self.log.record("chain.best_block_height");
        let state = self.state.lock();
        match &state.best_height_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.best_height),
        }
    }

    async fn voting_power(&self, btc_pk: &BtcPublicKey, height: u64) -> Result<u64, ChainError> {
        let state = self.state.lock();
        if let Some(err) = state.voting_power_errors.get(btc_pk) {
            return Err(err.clone());
        }
        state
            .voting_power
            .get(btc_pk)
            .copied()
            .ok_or(ChainError::VotingPowerTableNotUpdated { height })
    }

    async fn register_finality_provider(
        &self,
        btc_pk: &BtcPublicKey,
        pop: &[u8],
        commission: &Decimal,
        description: &[u8],
    ) -> Result<TxResponse, ChainError> {
        self.log.record(format!("chain.register {btc_pk}"));
        let delay = self.state.lock().registration_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if let Some(err) = state.registration_failures.pop_front() {
            return Err(err);
        }

        let mut hasher = Sha256::new();
        hasher.update(btc_pk.as_bytes());
        hasher.update((state.registrations.len() as u64).to_be_bytes());
        let tx_hash = hex::encode(hasher.finalize());

        state.registrations.push(RegistrationTx {
            btc_pk: *btc_pk,
            pop: pop.to_vec(),
            commission: *commission,
            description: description.to_vec(),
            tx_hash: tx_hash.clone(),
        });
        Ok(TxResponse { tx_hash })
    }
}
