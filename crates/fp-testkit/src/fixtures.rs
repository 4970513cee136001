//! Record fixtures and a ready-made set of mock collaborators.

use crate::chain::MockChainClient;
use crate::instances::MockInstanceManager;
use crate::keyring::{MockKeyring, ACCOUNT_PREFIX};
use crate::log::CallLog;
use crate::signer::MockSigner;
use crate::store::FaultyStore;
use fp_core::effects::FinalityProviderStore;
use fp_core::{
    BtcPublicKey, ChainAddress, Decimal, Description, FinalityProviderRecord,
    FinalityProviderStatus, ProofOfPossession,
};
use fp_store::MemoryFinalityProviderStore;
use k256::schnorr::SigningKey;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Deterministic BIP340 key for `seed`.
pub fn signing_key(seed: u8) -> SigningKey {
    let secret = Sha256::digest([b's', b'k', seed]);
    SigningKey::from_bytes(&secret).expect("sha256 output is a valid scalar")
}

/// Deterministic account address for `seed`.
pub fn test_address(seed: u8) -> ChainAddress {
    ChainAddress::from_bytes(ACCOUNT_PREFIX, &[seed; 20]).expect("valid address")
}

/// A record for `seed` with a valid proof-of-possession and the given status.
pub fn test_record(seed: u8, status: FinalityProviderStatus) -> FinalityProviderRecord {
    let key = signing_key(seed);
    let address = test_address(seed);
    let pop = ProofOfPossession::create(&address, &key).expect("pop");
    let mut record = FinalityProviderRecord::new(
        address,
        BtcPublicKey::from_verifying_key(key.verifying_key()),
        Description::with_moniker(format!("fp-{seed}")),
        Decimal::new(5, 2),
        pop,
        format!("key-{seed}"),
        "test-1",
    );
    record.status = status;
    record
}

/// One of every mock, wired to a shared call log.
///
/// `store` is the [`FaultyStore`] the app should be given; `records` is the
/// memory store behind it, for seeding and inspection.
#[derive(Debug, Clone)]
pub struct MockEnv {
    pub chain: Arc<MockChainClient>,
    pub signer: Arc<MockSigner>,
    pub keyring: Arc<MockKeyring>,
    pub records: Arc<MemoryFinalityProviderStore>,
    pub store: Arc<FaultyStore>,
    pub instances: Arc<MockInstanceManager>,
    pub log: CallLog,
}

impl MockEnv {
    pub fn new() -> Self {
        let log = CallLog::new();
        let records = Arc::new(MemoryFinalityProviderStore::new());
        let store = Arc::new(FaultyStore::new(records.clone()));
        let instances = Arc::new(
            MockInstanceManager::with_store(store.clone()).with_log(log.clone()),
        );
        Self {
            chain: Arc::new(MockChainClient::with_log(log.clone())),
            signer: Arc::new(MockSigner::with_log(log.clone())),
            keyring: Arc::new(MockKeyring::new()),
            records,
            store,
            instances,
            log,
        }
    }

    /// Insert `record` directly into the backing store.
    pub async fn seed(&self, record: FinalityProviderRecord) {
        self.records.create(record).await.expect("seed record");
    }

    /// Current stored status of `btc_pk`.
    pub async fn status_of(&self, btc_pk: &BtcPublicKey) -> FinalityProviderStatus {
        self.records.get(btc_pk).await.expect("stored record").status
    }
}

impl Default for MockEnv {
    fn default() -> Self {
        Self::new()
    }
}
