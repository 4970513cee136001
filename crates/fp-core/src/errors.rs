//! Core error types
//!
//! Validation and encoding failures raised by the domain types themselves.
//! Collaborator failures have their own enums next to each trait in
//! [`crate::effects`].

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors raised by domain types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Malformed or off-curve BTC public key
    #[error("Invalid BTC public key: {0}")]
    InvalidPublicKey(String),

    /// Malformed bech32 chain address
    #[error("Invalid chain address: {0}")]
    InvalidAddress(String),

    /// Signature failed to parse or verify
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Create an invalid public key error
    pub fn invalid_public_key(msg: impl Into<String>) -> Self {
        Self::InvalidPublicKey(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    /// Create an invalid signature error
    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::InvalidSignature(msg.into())
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
