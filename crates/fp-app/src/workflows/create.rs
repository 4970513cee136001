//! Finality provider creation.

use crate::collaborators::Collaborators;
use crate::errors::AppResult;
use crate::protocol::CreateFinalityProviderParams;
use fp_core::effects::KeyringError;
use fp_core::{
    BtcPublicKey, ChainAddress, FinalityProviderInfo, FinalityProviderRecord,
    FinalityProviderStatus, ProofOfPossession,
};

/// Address of `key_name`, creating the chain key when it does not exist yet.
pub(crate) async fn load_or_create_chain_key(
    deps: &Collaborators,
    key_name: &str,
    passphrase: &str,
    hd_path: &str,
) -> AppResult<ChainAddress> {
    match deps.keyring.address(key_name, passphrase).await {
        Ok(address) => Ok(address),
        Err(KeyringError::KeyNotFound(_)) => {
            let info = deps
                .keyring
                .create_chain_key(key_name, passphrase, hd_path)
                .await?;
            tracing::info!(key_name, address = %info.address, "created chain key");
            Ok(info.address)
        }
        Err(e) => Err(e.into()),
    }
}

/// Create and persist a new `CREATED` record.
///
/// Each step aborts on the first error; nothing already done is rolled back.
pub(crate) async fn create_finality_provider(
    deps: &Collaborators,
    params: CreateFinalityProviderParams,
) -> AppResult<FinalityProviderInfo> {
    let address =
        load_or_create_chain_key(deps, &params.key_name, &params.passphrase, &params.hd_path)
            .await?;

    let btc_pk = match params.btc_public_key {
        Some(pk) => pk,
        None => {
            let bytes = deps
                .signer
                .create_key(&params.key_name, &params.passphrase, &params.hd_path)
                .await?;
            BtcPublicKey::from_bytes(&bytes)?
        }
    };

    let key_record = deps
        .signer
        .key_record(btc_pk.as_bytes(), &params.passphrase)
        .await?;
    let pop = ProofOfPossession::create(&address, &key_record.private_key)?;

    let record = FinalityProviderRecord::new(
        address,
        btc_pk,
        params.description,
        params.commission,
        pop,
        params.key_name,
        params.chain_id,
    );
    let info = record.to_info();
    deps.store.create(record).await?;
    deps.metrics
        .record_status(&info.btc_pk_hex, FinalityProviderStatus::Created);

    tracing::info!(
        btc_pk = %info.btc_pk_hex,
        address = %info.address,
        "created finality provider"
    );
    Ok(info)
}
