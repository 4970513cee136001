//! Prometheus metrics for the locally managed finality providers.
//!
//! Gauges are labelled by hex public key and fed by status changes and by
//! the periodic snapshot of the metrics loop. Each [`FpMetrics`] owns its
//! own [`Registry`]; an exporter serves [`FpMetrics::registry`].

use fp_core::effects::MetricsSink;
use fp_core::{FinalityProviderRecord, FinalityProviderStatus};
use prometheus::core::Collector;
use prometheus::{IntCounter, IntGaugeVec, Opts, Registry};

const BTC_PK_LABEL: &str = "btc_pk_hex";

/// Status and progress gauges per provider.
pub struct FpMetrics {
    registry: Registry,
    status: IntGaugeVec,
    last_voted_height: IntGaugeVec,
    last_processed_height: IntGaugeVec,
    snapshots: IntCounter,
}

impl FpMetrics {
    /// Build the gauges and register them in a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let status = IntGaugeVec::new(
            Opts::new(
                "fp_status",
                "Status of a finality provider (0 created, 1 registered, 2 active, 3 inactive, 4 slashed)",
            ),
            &[BTC_PK_LABEL],
        )?;
        let last_voted_height = IntGaugeVec::new(
            Opts::new(
                "fp_last_voted_height",
                "Last height a finality provider voted on",
            ),
            &[BTC_PK_LABEL],
        )?;
        let last_processed_height = IntGaugeVec::new(
            Opts::new(
                "fp_last_processed_height",
                "Last height a finality provider processed",
            ),
            &[BTC_PK_LABEL],
        )?;
        let snapshots = IntCounter::new(
            "fp_metrics_snapshots_total",
            "Total number of exported finality provider snapshots",
        )?;

        registry.register(Box::new(status.clone()))?;
        registry.register(Box::new(last_voted_height.clone()))?;
        registry.register(Box::new(last_processed_height.clone()))?;
        registry.register(Box::new(snapshots.clone()))?;

        Ok(Self {
            registry,
            status,
            last_voted_height,
            last_processed_height,
            snapshots,
        })
    }

    /// Registry holding every gauge, for an exporter to gather.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Last recorded status of a provider
    pub fn status(&self, btc_pk_hex: &str) -> Option<FinalityProviderStatus> {
        gauge_value(&self.status, btc_pk_hex).and_then(status_from_code)
    }

    /// Last exported voted height of a provider
    pub fn last_voted_height(&self, btc_pk_hex: &str) -> Option<u64> {
        gauge_value(&self.last_voted_height, btc_pk_hex).map(height_from_gauge)
    }

    /// Last exported processed height of a provider
    pub fn last_processed_height(&self, btc_pk_hex: &str) -> Option<u64> {
        gauge_value(&self.last_processed_height, btc_pk_hex).map(height_from_gauge)
    }

    /// Number of providers currently in `status`
    pub fn count_with_status(&self, status: FinalityProviderStatus) -> usize {
        let code = status_code(status);
        self.status
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .filter(|m| m.get_gauge().get_value() as i64 == code)
            .count()
    }

    /// Number of snapshots exported so far
    pub fn snapshot_count(&self) -> u64 {
        self.snapshots.get()
    }

    fn set_status(&self, btc_pk_hex: &str, status: FinalityProviderStatus) {
        self.status
            .with_label_values(&[btc_pk_hex])
            .set(status_code(status));
    }
}

impl MetricsSink for FpMetrics {
    fn record_status(&self, btc_pk_hex: &str, status: FinalityProviderStatus) {
        self.set_status(btc_pk_hex, status);
    }

    fn update_snapshot(&self, records: &[FinalityProviderRecord]) {
        for record in records {
            let pk = record.btc_public_key.to_hex();
            self.set_status(&pk, record.status);
            self.last_voted_height
                .with_label_values(&[pk.as_str()])
                .set(height_to_gauge(record.last_voted_height));
            self.last_processed_height
                .with_label_values(&[pk.as_str()])
                .set(height_to_gauge(record.last_processed_height));
        }
        self.snapshots.inc();
    }
}

impl std::fmt::Debug for FpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FpMetrics")
            .field("snapshots", &self.snapshots.get())
            .finish_non_exhaustive()
    }
}

/// Value of the series labelled `btc_pk_hex`, without creating it.
fn gauge_value(vec: &IntGaugeVec, btc_pk_hex: &str) -> Option<i64> {
    vec.collect()
        .iter()
        .flat_map(|family| family.get_metric())
        .find(|m| {
            m.get_label()
                .iter()
                .any(|l| l.get_name() == BTC_PK_LABEL && l.get_value() == btc_pk_hex)
        })
        .map(|m| m.get_gauge().get_value() as i64)
}

fn status_code(status: FinalityProviderStatus) -> i64 {
    FinalityProviderStatus::ALL
        .iter()
        .position(|s| *s == status)
        .map_or(-1, |i| i as i64)
}

fn status_from_code(code: i64) -> Option<FinalityProviderStatus> {
    usize::try_from(code)
        .ok()
        .and_then(|i| FinalityProviderStatus::ALL.get(i).copied())
}

fn height_to_gauge(height: u64) -> i64 {
    i64::try_from(height).unwrap_or(i64::MAX)
}

fn height_from_gauge(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}
