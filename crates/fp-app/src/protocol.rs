//! Request/response protocol between callers and the actor.
//!
//! Each mutating operation crosses into the actor as a message carrying its
//! input and a one-shot [`Responder`]. The slot holds either the success
//! value or the error, so the loop answering it never blocks. Callers wait
//! on the slot and on the shutdown signal, whichever resolves first.

use crate::errors::{AppError, AppResult};
use crate::tasks::ShutdownSignal;
use fp_core::{BtcPublicKey, ChainAddress, Decimal, Description, FinalityProviderRecord};
use tokio::sync::{mpsc, oneshot};

/// Single-slot reply channel for one request.
pub type Responder<T> = oneshot::Sender<AppResult<T>>;

/// Input of the creation workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFinalityProviderParams {
    /// Chain keyring entry owning the provider
    pub key_name: String,
    /// Target chain
    pub chain_id: String,
    /// Passphrase for both the chain key and the EOTS key
    pub passphrase: String,
    /// HD derivation path for newly created keys
    pub hd_path: String,
    /// Existing EOTS key to use instead of creating one
    pub btc_public_key: Option<BtcPublicKey>,
    /// Provider metadata
    pub description: Description,
    /// Commission rate
    pub commission: Decimal,
}

impl CreateFinalityProviderParams {
    /// Params with an empty passphrase and HD path and a fresh EOTS key.
    pub fn new(
        key_name: impl Into<String>,
        chain_id: impl Into<String>,
        description: Description,
        commission: Decimal,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            chain_id: chain_id.into(),
            passphrase: String::new(),
            hd_path: String::new(),
            btc_public_key: None,
            description,
            commission,
        }
    }

    /// Passphrase protecting both keys.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = passphrase.into();
        self
    }

    /// HD derivation path for newly created keys.
    pub fn with_hd_path(mut self, hd_path: impl Into<String>) -> Self {
        self.hd_path = hd_path.into();
        self
    }

    /// Reuse an EOTS key already held by the signer.
    pub fn with_btc_public_key(mut self, btc_pk: BtcPublicKey) -> Self {
        self.btc_public_key = Some(btc_pk);
        self
    }
}

/// Reply to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFinalityProviderResponse {
    /// Address owning the provider
    pub chain_address: ChainAddress,
    /// Registered provider
    pub btc_public_key: BtcPublicKey,
    /// Registration transaction hash
    pub tx_hash: String,
}

/// Request served by the event loop.
#[derive(Debug)]
pub(crate) struct CreateFinalityProviderRequest {
    pub params: CreateFinalityProviderParams,
    pub responder: Responder<fp_core::FinalityProviderInfo>,
}

/// Request served by the registration loop.
#[derive(Debug)]
pub(crate) struct RegisterFinalityProviderRequest {
    pub record: FinalityProviderRecord,
    pub responder: Responder<RegisterFinalityProviderResponse>,
}

/// Emitted by the registration loop once the transaction succeeded.
///
/// Carries the original caller's responder so the event loop can answer
/// after persisting `REGISTERED`.
#[derive(Debug)]
pub(crate) struct FinalityProviderRegisteredEvent {
    pub chain_address: ChainAddress,
    pub btc_public_key: BtcPublicKey,
    pub tx_hash: String,
    pub responder: Responder<RegisterFinalityProviderResponse>,
}

/// Answer a request; a caller that already gave up is not an error.
pub(crate) fn respond<T>(responder: Responder<T>, result: AppResult<T>) {
    if responder.send(result).is_err() {
        tracing::debug!("caller dropped before the response was delivered");
    }
}

/// Submit `msg` and wait for its answer, racing both steps against shutdown.
///
/// A closed queue or a responder dropped unanswered means the loop is gone,
/// which is reported as [`AppError::ShuttingDown`].
pub(crate) async fn round_trip<M, T>(
    queue: &mpsc::Sender<M>,
    make: impl FnOnce(Responder<T>) -> M,
    mut shutdown: ShutdownSignal,
) -> AppResult<T> {
    if shutdown.is_shutdown() {
        return Err(AppError::ShuttingDown);
    }

    let (responder, response) = oneshot::channel();
    let msg = make(responder);

    tokio::select! {
        sent = queue.send(msg) => {
            if sent.is_err() {
                return Err(AppError::ShuttingDown);
            }
        }
        _ = shutdown.wait() => return Err(AppError::ShuttingDown),
    }

    tokio::select! {
        biased;
        result = response => result.unwrap_or(Err(AppError::ShuttingDown)),
        _ = shutdown.wait() => Err(AppError::ShuttingDown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskRegistry;

    #[tokio::test]
    async fn test_round_trip_delivers_response() {
        let registry = TaskRegistry::new();
        let (tx, mut rx) = mpsc::channel::<Responder<u32>>(1);
        tokio::spawn(async move {
            if let Some(responder) = rx.recv().await {
                respond(responder, Ok(7));
            }
        });

        let value = round_trip(&tx, |r| r, registry.subscribe()).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_error_travels_through_the_same_slot() {
        let registry = TaskRegistry::new();
        let (tx, mut rx) = mpsc::channel::<Responder<u32>>(1);
        tokio::spawn(async move {
            if let Some(responder) = rx.recv().await {
                respond(responder, Err(AppError::serialization("bad")));
            }
        });

        let err = round_trip(&tx, |r| r, registry.subscribe()).await.unwrap_err();
        assert_eq!(err, AppError::Serialization("bad".to_string()));
    }

    #[tokio::test]
    async fn test_shutdown_while_waiting() {
        let registry = TaskRegistry::new();
        let (tx, _rx) = mpsc::channel::<Responder<u32>>(1);
        let shutdown = registry.subscribe();

        let call = tokio::spawn(async move { round_trip(&tx, |r| r, shutdown).await });
        tokio::task::yield_now().await;
        registry.signal_shutdown();

        assert!(call.await.unwrap().unwrap_err().is_shutdown());
    }

    #[tokio::test]
    async fn test_dropped_responder_is_shutdown() {
        let registry = TaskRegistry::new();
        let (tx, mut rx) = mpsc::channel::<Responder<u32>>(1);
        tokio::spawn(async move {
            drop(rx.recv().await);
        });

        let err = round_trip(&tx, |r| r, registry.subscribe()).await.unwrap_err();
        assert!(err.is_shutdown());
    }

    #[tokio::test]
    async fn test_closed_queue_is_shutdown() {
        let registry = TaskRegistry::new();
        let (tx, rx) = mpsc::channel::<Responder<u32>>(1);
        drop(rx);

        let err = round_trip(&tx, |r| r, registry.subscribe()).await.unwrap_err();
        assert!(err.is_shutdown());
    }
}
