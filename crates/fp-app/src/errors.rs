//! Application error types
//!
//! [`AppError`] is what every public operation of the actor returns. It
//! wraps the collaborator errors from `fp_core::effects` and adds the
//! actor's own input, lifecycle and shutdown failures.

use fp_core::effects::{ChainError, InstanceError, KeyringError, SignerError, StoreError};
use fp_core::{BtcPublicKey, CoreError, FinalityProviderStatus};
use thiserror::Error;

/// Result type for application operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Unrecoverable failure: local state diverged from the chain.
///
/// Raised when a registration transaction succeeded on chain but the
/// `REGISTERED` status could not be written locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to persist REGISTERED status for {btc_pk} (tx {tx_hash}): {reason}")]
pub struct FatalError {
    /// Provider whose status write failed
    pub btc_pk: BtcPublicKey,
    /// Hash of the already-accepted registration transaction
    pub tx_hash: String,
    /// Underlying store failure
    pub reason: String,
}

/// Errors returned by the application actor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Malformed BTC public key input
    #[error("Invalid BTC public key: {0}")]
    InvalidPublicKey(String),

    /// Malformed chain address
    #[error("Invalid chain address: {0}")]
    InvalidAddress(String),

    /// Proof-of-possession could not be produced or checked
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Registration requested for a provider past `CREATED`
    #[error("finality provider {btc_pk} is already registered (status {status})")]
    AlreadyRegistered {
        /// Provider key
        btc_pk: BtcPublicKey,
        /// Current stored status
        status: FinalityProviderStatus,
    },

    /// Payload marshalling failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The actor shut down before answering
    #[error("finality provider app is shutting down")]
    ShuttingDown,

    /// Local state diverged from the chain
    #[error("Fatal: {0}")]
    Fatal(#[from] FatalError),

    /// `start` called more than once
    #[error("finality provider app already started")]
    AlreadyStarted,

    /// `stop` called more than once
    #[error("finality provider app already stopped")]
    AlreadyStopped,

    /// Rejected configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Consumer chain failure
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// EOTS signer failure
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Chain keyring failure
    #[error(transparent)]
    Keyring(#[from] KeyringError),

    /// Provider store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Voting instance failure
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

impl AppError {
    /// Create an invalid public key error
    pub fn invalid_public_key(msg: impl Into<String>) -> Self {
        Self::InvalidPublicKey(msg.into())
    }

    /// Create a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether the call was abandoned because the actor shut down.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, AppError::ShuttingDown)
    }

    /// Whether the error is unrecoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Fatal(_))
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPublicKey(msg) => Self::InvalidPublicKey(msg),
            CoreError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            CoreError::InvalidSignature(msg) => Self::InvalidSignature(msg),
            CoreError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(AppError::ShuttingDown.is_shutdown());
        assert!(!AppError::ShuttingDown.is_fatal());
        assert!(!AppError::from(ChainError::rpc("down")).is_shutdown());
    }

    #[test]
    fn test_core_errors_keep_their_kind() {
        assert!(matches!(
            AppError::from(CoreError::invalid_public_key("short")),
            AppError::InvalidPublicKey(msg) if msg == "short"
        ));
        assert!(matches!(
            AppError::from(CoreError::serialization("eof")),
            AppError::Serialization(_)
        ));
    }

    #[test]
    fn test_collaborator_errors_are_transparent() {
        let err = AppError::from(StoreError::io("disk full"));
        assert_eq!(err.to_string(), "Store I/O error: disk full");
    }
}
