//! EOTS signer service contract.

use async_trait::async_trait;
use k256::schnorr::SigningKey;
use thiserror::Error;

/// Errors reported by the signer service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// No key for the given public key
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Passphrase rejected
    #[error("Invalid passphrase for key {0}")]
    InvalidPassphrase(String),

    /// Connection already closed
    #[error("Signer connection closed")]
    Closed,

    /// Any other signer failure
    #[error("Signer error: {0}")]
    Internal(String),
}

/// Private key material for one EOTS key.
///
/// Only used to build the proof-of-possession; never leaves the creation
/// workflow.
#[derive(Clone)]
pub struct KeyRecord {
    /// Key name in the signer
    pub name: String,
    /// BIP340 signing key
    pub private_key: SigningKey,
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Remote EOTS manager holding the providers' BTC keys.
#[async_trait]
pub trait SignerService: Send + Sync {
    /// Create (or return the existing) key for `name`; returns the x-only public key bytes.
    async fn create_key(
        &self,
        name: &str,
        passphrase: &str,
        hd_path: &str,
    ) -> Result<Vec<u8>, SignerError>;

    /// Private key record for a public key.
    async fn key_record(&self, btc_pk: &[u8], passphrase: &str) -> Result<KeyRecord, SignerError>;

    /// Close the connection to the signer.
    async fn close(&self) -> Result<(), SignerError>;
}
