//! # FP Store - Finality Provider Record Storage
//!
//! Reference [`FinalityProviderStore`](fp_core::effects::FinalityProviderStore)
//! backend. The on-disk encoding used in production deployments is provided
//! by the embedding binary; this crate keeps records in memory with the same
//! uniqueness and atomicity guarantees.

mod memory;

pub use memory::MemoryFinalityProviderStore;
