//! Metrics sink contract.

use crate::record::FinalityProviderRecord;
use crate::status::FinalityProviderStatus;

/// Receiver of status observations and periodic snapshots.
pub trait MetricsSink: Send + Sync {
    /// Record the status of one provider.
    fn record_status(&self, btc_pk_hex: &str, status: FinalityProviderStatus);

    /// Replace the exported snapshot with the given records.
    fn update_snapshot(&self, records: &[FinalityProviderRecord]);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_status(&self, _btc_pk_hex: &str, _status: FinalityProviderStatus) {}

    fn update_snapshot(&self, _records: &[FinalityProviderRecord]) {}
}
