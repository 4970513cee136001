//! Finality provider registration.

use crate::collaborators::Collaborators;
use crate::errors::{AppError, AppResult, FatalError};
use crate::protocol::RegisterFinalityProviderResponse;
use fp_core::effects::TxResponse;
use fp_core::{BtcPublicKey, ChainAddress, FinalityProviderRecord, FinalityProviderStatus};

/// Reject any record that already left `CREATED`.
pub(crate) fn ensure_registrable(record: &FinalityProviderRecord) -> AppResult<()> {
    if record.status != FinalityProviderStatus::Created {
        return Err(AppError::AlreadyRegistered {
            btc_pk: record.btc_public_key,
            status: record.status,
        });
    }
    Ok(())
}

/// Submit the registration transaction for `record`.
pub(crate) async fn submit_registration(
    deps: &Collaborators,
    record: &FinalityProviderRecord,
) -> AppResult<TxResponse> {
    let pop = record.proof_of_possession.to_bytes()?;
    let description = record.description.to_bytes()?;

    let res = deps
        .chain
        .register_finality_provider(&record.btc_public_key, &pop, &record.commission, &description)
        .await
        .map_err(|e| {
            tracing::error!(
                btc_pk = %record.btc_public_key,
                error = %e,
                "failed to register finality provider"
            );
            e
        })?;

    tracing::info!(
        btc_pk = %record.btc_public_key,
        tx_hash = %res.tx_hash,
        "registration transaction accepted"
    );
    Ok(res)
}

/// Persist `REGISTERED` after the transaction succeeded.
///
/// A failure here means the chain and the store disagree, so it is fatal.
pub(crate) async fn persist_registered(
    deps: &Collaborators,
    chain_address: ChainAddress,
    btc_pk: BtcPublicKey,
    tx_hash: String,
) -> Result<RegisterFinalityProviderResponse, FatalError> {
    if let Err(e) = deps
        .store
        .set_status(&btc_pk, FinalityProviderStatus::Registered)
        .await
    {
        return Err(FatalError {
            btc_pk,
            tx_hash,
            reason: e.to_string(),
        });
    }
    deps.metrics
        .record_status(&btc_pk.to_hex(), FinalityProviderStatus::Registered);

    tracing::info!(btc_pk = %btc_pk, tx_hash = %tx_hash, "finality provider registered");
    Ok(RegisterFinalityProviderResponse {
        chain_address,
        btc_public_key: btc_pk,
        tx_hash,
    })
}
