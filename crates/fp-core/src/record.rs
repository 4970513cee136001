//! Persisted finality provider record and its public view.

use crate::errors::CoreResult;
use crate::keys::{BtcPublicKey, ChainAddress};
use crate::pop::ProofOfPossession;
use crate::status::FinalityProviderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Human-facing provider metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Display name
    pub moniker: String,
    /// Optional identity signature (e.g. Keybase)
    #[serde(default)]
    pub identity: String,
    /// Optional website
    #[serde(default)]
    pub website: String,
    /// Optional security contact
    #[serde(default)]
    pub security_contact: String,
    /// Free-form details
    #[serde(default)]
    pub details: String,
}

impl Description {
    /// Description with only a moniker set.
    pub fn with_moniker(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }

    /// Encoding carried in the registration transaction.
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A finality provider as stored locally, keyed by its BTC public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityProviderRecord {
    /// Chain account owning the provider
    pub address: ChainAddress,
    /// Provider identity on Bitcoin; immutable
    pub btc_public_key: BtcPublicKey,
    /// Provider metadata
    pub description: Description,
    /// Commission rate
    pub commission: Decimal,
    /// Set once at creation, never recomputed
    pub proof_of_possession: ProofOfPossession,
    /// Name of the local chain key
    pub key_name: String,
    /// Target chain
    pub chain_id: String,
    /// Highest height this provider voted on
    pub last_voted_height: u64,
    /// Highest height the voting instance processed
    pub last_processed_height: u64,
    /// Current lifecycle status
    pub status: FinalityProviderStatus,
}

impl FinalityProviderRecord {
    /// Fresh record in status `CREATED`.
    pub fn new(
        address: ChainAddress,
        btc_public_key: BtcPublicKey,
        description: Description,
        commission: Decimal,
        proof_of_possession: ProofOfPossession,
        key_name: impl Into<String>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            address,
            btc_public_key,
            description,
            commission,
            proof_of_possession,
            key_name: key_name.into(),
            chain_id: chain_id.into(),
            last_voted_height: 0,
            last_processed_height: 0,
            status: FinalityProviderStatus::Created,
        }
    }

    /// Whether the status should be re-evaluated for this voting power.
    pub fn should_sync_status(&self, voting_power: u64) -> bool {
        self.status.should_sync(voting_power)
    }

    /// Whether a voting instance may run for this provider.
    pub fn should_start(&self) -> bool {
        self.status.should_start()
    }

    /// Public view returned to callers.
    pub fn to_info(&self) -> FinalityProviderInfo {
        FinalityProviderInfo {
            address: self.address.to_string(),
            btc_pk_hex: self.btc_public_key.to_hex(),
            description: self.description.clone(),
            commission: self.commission.to_string(),
            last_voted_height: self.last_voted_height,
            status: self.status.to_string(),
        }
    }
}

/// Public view of a provider, safe to hand to CLIs and RPC handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityProviderInfo {
    /// Chain account address
    pub address: String,
    /// Hex-encoded BTC public key
    pub btc_pk_hex: String,
    /// Provider metadata
    pub description: Description,
    /// Commission rate as a decimal string
    pub commission: String,
    /// Highest voted height
    pub last_voted_height: u64,
    /// Status name
    pub status: String,
}
