//! Handles to the subsystems the actor drives.

use fp_core::effects::{
    ChainClient, ChainKeyring, FinalityProviderStore, InstanceManager, MetricsSink, NoopMetrics,
    SignerService,
};
use std::sync::Arc;

/// Every collaborator the actor needs, shared across its loops.
#[derive(Clone)]
pub struct Collaborators {
    /// Consumer chain client
    pub chain: Arc<dyn ChainClient>,
    /// EOTS signer service
    pub signer: Arc<dyn SignerService>,
    /// Chain account keyring
    pub keyring: Arc<dyn ChainKeyring>,
    /// Persisted provider records
    pub store: Arc<dyn FinalityProviderStore>,
    /// Voting instance manager
    pub instances: Arc<dyn InstanceManager>,
    /// Status metrics sink
    pub metrics: Arc<dyn MetricsSink>,
}

impl Collaborators {
    /// Collaborators with metrics discarded.
    pub fn new(
        chain: Arc<dyn ChainClient>,
        signer: Arc<dyn SignerService>,
        keyring: Arc<dyn ChainKeyring>,
        store: Arc<dyn FinalityProviderStore>,
        instances: Arc<dyn InstanceManager>,
    ) -> Self {
        Self {
            chain,
            signer,
            keyring,
            store,
            instances,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replace the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
