//! Consumer chain client contract.

use crate::keys::BtcPublicKey;
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors reported by the chain client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The voting power table has no entry yet for this height.
    ///
    /// Benign: the provider is simply not visible on chain yet.
    #[error("Voting power table not updated at height {height}")]
    VotingPowerTableNotUpdated {
        /// Queried height
        height: u64,
    },

    /// Query or transport failure
    #[error("Chain RPC error: {0}")]
    Rpc(String),

    /// Transaction rejected or failed to execute
    #[error("Transaction failed: {0}")]
    TxFailed(String),
}

impl ChainError {
    /// Create an RPC error
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Create a transaction failure
    pub fn tx_failed(msg: impl Into<String>) -> Self {
        Self::TxFailed(msg.into())
    }

    /// Whether the error means "no voting power recorded yet".
    pub fn is_voting_power_not_updated(&self) -> bool {
        matches!(self, ChainError::VotingPowerTableNotUpdated { .. })
    }
}

/// Result of a broadcast transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    /// Hex transaction hash
    pub tx_hash: String,
}

/// Queries and transactions against the consumer chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Height of the latest block.
    async fn best_block_height(&self) -> Result<u64, ChainError>;

    /// Voting power of the provider at `height`.
    async fn voting_power(&self, btc_pk: &BtcPublicKey, height: u64) -> Result<u64, ChainError>;

    /// Submit the provider registration transaction.
    async fn register_finality_provider(
        &self,
        btc_pk: &BtcPublicKey,
        pop: &[u8],
        commission: &Decimal,
        description: &[u8],
    ) -> Result<TxResponse, ChainError>;
}
