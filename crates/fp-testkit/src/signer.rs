//! In-memory EOTS signer.

use crate::log::CallLog;
use async_trait::async_trait;
use fp_core::effects::{KeyRecord, SignerError, SignerService};
use fp_core::BtcPublicKey;
use k256::schnorr::SigningKey;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct StoredKey {
    name: String,
    passphrase: String,
    secret: [u8; 32],
}

#[derive(Debug, Default)]
struct SignerState {
    names: BTreeMap<String, BtcPublicKey>,
    keys: BTreeMap<BtcPublicKey, StoredKey>,
    closed: bool,
}

/// Signer deriving keys deterministically from the key name and HD path.
///
/// Creating a key twice under the same name returns the existing key.
#[derive(Debug, Default)]
pub struct MockSigner {
    state: Mutex<SignerState>,
    log: CallLog,
}

impl MockSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signer recording its calls into `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            state: Mutex::default(),
            log,
        }
    }

    /// Register an externally generated key under `name`.
    pub fn import_key(&self, name: &str, passphrase: &str, key: &SigningKey) -> BtcPublicKey {
        let pk = BtcPublicKey::from_verifying_key(key.verifying_key());
        let mut state = self.state.lock();
        state.names.insert(name.to_string(), pk);
        state.keys.insert(
            pk,
            StoredKey {
                name: name.to_string(),
                passphrase: passphrase.to_string(),
                secret: key.to_bytes().into(),
            },
        );
        pk
    }

    /// Public key stored under `name`.
    pub fn key_for(&self, name: &str) -> Option<BtcPublicKey> {
        self.state.lock().names.get(name).copied()
    }

    pub fn key_count(&self) -> usize {
        self.state.lock().keys.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[async_trait]
impl SignerService for MockSigner {
    async fn create_key(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<Vec<u8>, SignerError> {
        self.log.record(format!("signer.create_key {name}"));
        let mut state = self.state.lock();
        if state.closed {
            return Err(SignerError::Closed);
        }
        if let Some(pk) = state.names.get(name) {
            return Ok(pk.as_bytes().to_vec());
        }

        let mut hasher = Sha256::new();
        hasher.update(b"eots:");
        hasher.update(name.as_bytes());
        hasher.update(hd_path.as_bytes());
        let secret: [u8; 32] = hasher.finalize().into();
        let key = SigningKey::from_bytes(&secret)
            .map_err(|e| SignerError::Internal(e.to_string()))?;
        let pk = BtcPublicKey::from_verifying_key(key.verifying_key());

        state.names.insert(name.to_string(), pk);
        state.keys.insert(
            pk,
            StoredKey {
                name: name.to_string(),
                passphrase: passphrase.to_string(),
                secret,
            },
        );
        Ok(pk.as_bytes().to_vec())
    }

    async fn key_record(&self, btc_pk: &[u8], passphrase: &str) -> Result<KeyRecord, SignerError> {
        let state = self.state.lock();
        if state.closed {
            return Err(SignerError::Closed);
        }
        let pk = BtcPublicKey::from_bytes(btc_pk)
            .map_err(|e| SignerError::KeyNotFound(e.to_string()))?;
        let stored = state
            .keys
            .get(&pk)
            .ok_or_else(|| SignerError::KeyNotFound(pk.to_hex()))?;
        if stored.passphrase != passphrase {
            return Err(SignerError::InvalidPassphrase(stored.name.clone()));
        }
        let private_key = SigningKey::from_bytes(&stored.secret)
            .map_err(|e| SignerError::Internal(e.to_string()))?;
        Ok(KeyRecord {
            name: stored.name.clone(),
            private_key,
        })
    }

    async fn close(&self) -> Result<(), SignerError> {
        self.log.record("signer.close");
        self.state.lock().closed = true;
        Ok(())
    }
}
