//! The actor's worker loops.
//!
//! - Event loop: creation requests and registered events; the only loop
//!   writing to the store besides the status sync tick
//! - Registration loop: registration transactions
//! - Status sync tick and metrics tick, driven by
//!   [`TaskRegistry::spawn_interval_until`](crate::tasks::TaskRegistry::spawn_interval_until)
//!
//! Every loop handles one message at a time and exits on shutdown. A fatal
//! error in the event loop broadcasts shutdown to the others, so no further
//! registration reaches the chain once the store has diverged from it.

use crate::collaborators::Collaborators;
use crate::errors::{AppError, FatalError};
use crate::protocol::{
    respond, CreateFinalityProviderRequest, FinalityProviderRegisteredEvent,
    RegisterFinalityProviderRequest,
};
use crate::status_sync::sync_status_once;
use crate::tasks::{ShutdownSignal, ShutdownTrigger};
use crate::workflows::{create, register};
use tokio::sync::mpsc;

/// Receiving ends of the actor's queues, taken once by `start`.
#[derive(Debug)]
pub(crate) struct LoopReceivers {
    pub create_rx: mpsc::Receiver<CreateFinalityProviderRequest>,
    pub register_rx: mpsc::Receiver<RegisterFinalityProviderRequest>,
    pub registered_rx: mpsc::Receiver<FinalityProviderRegisteredEvent>,
}

pub(crate) async fn run_event_loop(
    deps: Collaborators,
    mut create_rx: mpsc::Receiver<CreateFinalityProviderRequest>,
    mut registered_rx: mpsc::Receiver<FinalityProviderRegisteredEvent>,
    fatal_tx: mpsc::UnboundedSender<FatalError>,
    trigger: ShutdownTrigger,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            Some(req) = create_rx.recv() => {
                let result = create::create_finality_provider(&deps, req.params).await;
                if let Err(e) = &result {
                    tracing::error!(error = %e, "failed to create finality provider");
                }
                respond(req.responder, result);
            }
            Some(event) = registered_rx.recv() => {
                let FinalityProviderRegisteredEvent {
                    chain_address,
                    btc_public_key,
                    tx_hash,
                    responder,
                } = event;
                match register::persist_registered(&deps, chain_address, btc_public_key, tx_hash)
                    .await
                {
                    Ok(res) => respond(responder, Ok(res)),
                    Err(fatal) => {
                        tracing::error!(error = %fatal, "fatal error, shutting down worker loops");
                        trigger.trigger();
                        if fatal_tx.send(fatal.clone()).is_err() {
                            tracing::debug!("no supervisor listening for fatal errors");
                        }
                        respond(responder, Err(AppError::Fatal(fatal)));
                        break;
                    }
                }
            }
            else => break,
        }
    }
    tracing::debug!("event loop exited");
}

pub(crate) async fn run_registration_loop(
    deps: Collaborators,
    mut register_rx: mpsc::Receiver<RegisterFinalityProviderRequest>,
    registered_tx: mpsc::Sender<FinalityProviderRegisteredEvent>,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            Some(req) = register_rx.recv() => {
                let tx = match register::submit_registration(&deps, &req.record).await {
                    Ok(tx) => tx,
                    Err(e) => {
                        respond(req.responder, Err(e));
                        continue;
                    }
                };
                let event = FinalityProviderRegisteredEvent {
                    chain_address: req.record.address,
                    btc_public_key: req.record.btc_public_key,
                    tx_hash: tx.tx_hash,
                    responder: req.responder,
                };
                tokio::select! {
                    sent = registered_tx.send(event) => {
                        if let Err(mpsc::error::SendError(event)) = sent {
                            respond(event.responder, Err(AppError::ShuttingDown));
                        }
                    }
                    _ = shutdown.wait() => break,
                }
            }
            else => break,
        }
    }
    tracing::debug!("registration loop exited");
}

/// One status sync tick; `false` ends the loop once an instance runs.
pub(crate) async fn status_sync_tick(deps: &Collaborators) -> bool {
    match sync_status_once(deps).await {
        Ok(true) => {
            tracing::info!("finality provider instance running, status sync finished");
            false
        }
        Ok(false) => true,
        Err(e) => {
            tracing::error!(error = %e, "failed to sync finality provider status");
            true
        }
    }
}

/// Export a snapshot of every stored record.
pub(crate) async fn metrics_tick(deps: &Collaborators) -> bool {
    match deps.store.list_all().await {
        Ok(records) => deps.metrics.update_snapshot(&records),
        Err(e) => tracing::warn!(error = %e, "failed to load finality providers for metrics"),
    }
    true
}
