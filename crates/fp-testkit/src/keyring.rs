//! In-memory chain keyring.

use async_trait::async_trait;
use fp_core::effects::{ChainKeyInfo, ChainKeyring, KeyringError};
use fp_core::ChainAddress;
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Address prefix of the accounts this keyring hands out.
pub const ACCOUNT_PREFIX: &str = "bbn";

#[derive(Clone)]
struct ChainKey {
    passphrase: String,
    key: SigningKey,
    address: ChainAddress,
}

/// Keyring deriving secp256k1 account keys from the key name and HD path.
#[derive(Default)]
pub struct MockKeyring {
    keys: Mutex<BTreeMap<String, ChainKey>>,
}

impl MockKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }

    /// Verifying key of `key_name`, for checking signatures.
    pub fn verifying_key(&self, key_name: &str) -> Option<VerifyingKey> {
        self.keys
            .lock()
            .get(key_name)
            .map(|k| VerifyingKey::from(&k.key))
    }

    fn unlock(&self, key_name: &str, passphrase: &str) -> Result<ChainKey, KeyringError> {
        let keys = self.keys.lock();
        let key = keys
            .get(key_name)
            .ok_or_else(|| KeyringError::KeyNotFound(key_name.to_string()))?;
        if key.passphrase != passphrase {
            return Err(KeyringError::InvalidPassphrase(key_name.to_string()));
        }
        Ok(key.clone())
    }
}

impl std::fmt::Debug for MockKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockKeyring")
            .field("keys", &self.keys.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ChainKeyring for MockKeyring {
    async fn address(&self, key_name: &str, passphrase: &str) -> Result<ChainAddress, KeyringError> {
        Ok(self.unlock(key_name, passphrase)?.address)
    }

    async fn create_chain_key(
        &self,
        key_name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<ChainKeyInfo, KeyringError> {
        let mut keys = self.keys.lock();
        if keys.contains_key(key_name) {
            return Err(KeyringError::Internal(format!(
                "chain key {key_name} already exists"
            )));
        }

        let seed = Sha256::new()
            .chain_update(b"chain:")
            .chain_update(key_name.as_bytes())
            .chain_update(hd_path.as_bytes())
            .finalize();
        let key =
            SigningKey::from_slice(&seed).map_err(|e| KeyringError::Internal(e.to_string()))?;
        let public_key = key.verifying_key().to_encoded_point(true).as_bytes().to_vec();
        let account = Sha256::digest(&public_key);
        let address = ChainAddress::from_bytes(ACCOUNT_PREFIX, &account[..20])
            .map_err(|e| KeyringError::Internal(e.to_string()))?;

        keys.insert(
            key_name.to_string(),
            ChainKey {
                passphrase: passphrase.to_string(),
                key,
                address: address.clone(),
            },
        );
        Ok(ChainKeyInfo {
            name: key_name.to_string(),
            address,
            public_key,
        })
    }

    async fn sign(
        &self,
        key_name: &str,
        passphrase: &str,
        msg: &[u8],
    ) -> Result<Vec<u8>, KeyringError> {
        let key = self.unlock(key_name, passphrase)?;
        let signature: Signature = key.key.sign(msg);
        Ok(signature.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use k256::ecdsa::signature::Verifier;

    #[tokio::test]
    async fn test_missing_key_then_create() {
        let keyring = MockKeyring::new();
        assert_matches!(
            keyring.address("alice", "").await,
            Err(KeyringError::KeyNotFound(name)) if name == "alice"
        );

        let info = keyring.create_chain_key("alice", "", "").await.unwrap();
        assert_eq!(info.address.prefix(), ACCOUNT_PREFIX);
        assert_eq!(info.public_key.len(), 33);
        assert_eq!(keyring.address("alice", "").await.unwrap(), info.address);
    }

    #[tokio::test]
    async fn test_signature_verifies() {
        let keyring = MockKeyring::new();
        keyring.create_chain_key("bob", "pw", "").await.unwrap();

        let sig = keyring.sign("bob", "pw", b"hello").await.unwrap();
        let sig = Signature::from_slice(&sig).unwrap();
        keyring
            .verifying_key("bob")
            .unwrap()
            .verify(b"hello", &sig)
            .unwrap();
        assert!(keyring.sign("bob", "bad", b"hello").await.is_err());
    }
}
