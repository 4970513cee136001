//! # FP Core - Finality Provider Domain
//!
//! Pure domain layer for the finality provider daemon.
//!
//! ## Purpose
//!
//! - The persisted [`FinalityProviderRecord`] and its public [`FinalityProviderInfo`] view
//! - The [`FinalityProviderStatus`] state machine driven by on-chain voting power
//! - Proof-of-possession construction and verification
//! - Collaborator contracts ([`effects`]) for the chain, signer, keyring,
//!   store, voting instances and metrics
//!
//! ## What Does NOT Belong Here
//!
//! - Concurrency, request routing and lifecycle (belong in `fp-app`)
//! - Store backends (belong in `fp-store`)
//! - Mock collaborators and fixtures (belong in `fp-testkit`)

pub mod effects;
pub mod errors;
pub mod keys;
pub mod pop;
pub mod record;
pub mod status;

pub use errors::{CoreError, CoreResult};
pub use keys::{BtcPublicKey, ChainAddress};
pub use pop::{BtcSigType, ProofOfPossession};
pub use record::{Description, FinalityProviderInfo, FinalityProviderRecord};
pub use status::FinalityProviderStatus;

pub use rust_decimal::Decimal;
