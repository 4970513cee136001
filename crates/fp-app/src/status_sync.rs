//! Reconciliation of stored statuses against on-chain voting power.

use crate::collaborators::Collaborators;
use crate::errors::AppResult;
use fp_core::effects::{ChainError, InstanceError};
use fp_core::FinalityProviderRecord;

/// Voting power of `record` at `height`; `None` skips the record this tick.
async fn voting_power_at(
    deps: &Collaborators,
    record: &FinalityProviderRecord,
    height: u64,
) -> Option<u64> {
    match deps.chain.voting_power(&record.btc_public_key, height).await {
        Ok(vp) => Some(vp),
        Err(ChainError::VotingPowerTableNotUpdated { .. }) => Some(0),
        Err(e) => {
            tracing::warn!(
                btc_pk = %record.btc_public_key,
                height,
                error = %e,
                "skipping status sync, voting power unavailable"
            );
            None
        }
    }
}

/// Run one synchronization pass over every stored record.
///
/// Returns whether any voting instance is running afterwards.
pub(crate) async fn sync_status_once(deps: &Collaborators) -> AppResult<bool> {
    let height = deps.chain.best_block_height().await?;
    let records = deps.store.list_all().await?;

    let mut instance_running = false;
    for record in records {
        let Some(vp) = voting_power_at(deps, &record, height).await else {
            continue;
        };

        if deps.instances.is_running(&record.btc_public_key) {
            instance_running = true;
            continue;
        }

        if !record.should_sync_status(vp) {
            continue;
        }

        let old_status = record.status;
        let new_status = deps.store.update_status_from_voting_power(vp, &record).await?;
        if new_status != old_status {
            deps.metrics
                .record_status(&record.btc_public_key.to_hex(), new_status);
            tracing::info!(
                btc_pk = %record.btc_public_key,
                address = %record.address,
                old_status = %old_status,
                new_status = %new_status,
                voting_power = vp,
                "updated finality provider status"
            );
        }

        if !new_status.should_start() {
            continue;
        }

        match deps.instances.start(&record.btc_public_key, "").await {
            Ok(()) => {
                tracing::info!(btc_pk = %record.btc_public_key, "started finality provider instance");
            }
            // A concurrent pass started it first.
            Err(InstanceError::AlreadyRunning(_)) => {
                tracing::debug!(btc_pk = %record.btc_public_key, "finality provider instance already running");
            }
            Err(e) => return Err(e.into()),
        }
        instance_running = true;
    }

    Ok(instance_running)
}
