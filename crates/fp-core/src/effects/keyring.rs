//! Chain account keyring contract.

use crate::keys::ChainAddress;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the keyring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyringError {
    /// No key stored under this name
    #[error("Chain key not found: {0}")]
    KeyNotFound(String),

    /// Passphrase rejected
    #[error("Invalid passphrase for chain key {0}")]
    InvalidPassphrase(String),

    /// Any other keyring failure
    #[error("Keyring error: {0}")]
    Internal(String),
}

/// Public information about a chain key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainKeyInfo {
    /// Key name
    pub name: String,
    /// Account address derived from the key
    pub address: ChainAddress,
    /// Compressed secp256k1 public key
    pub public_key: Vec<u8>,
}

/// Local keyring holding the providers' chain account keys.
#[async_trait]
pub trait ChainKeyring: Send + Sync {
    /// Address of the key named `key_name`, or [`KeyringError::KeyNotFound`].
    async fn address(&self, key_name: &str, passphrase: &str) -> Result<ChainAddress, KeyringError>;

    /// Create a new chain key.
    async fn create_chain_key(
        &self,
        key_name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<ChainKeyInfo, KeyringError>;

    /// Sign raw bytes with the chain key.
    async fn sign(
        &self,
        key_name: &str,
        passphrase: &str,
        msg: &[u8],
    ) -> Result<Vec<u8>, KeyringError>;
}
