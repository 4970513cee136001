//! The finality provider application actor.
//!
//! Mutating operations are serialized through the worker loops in
//! [`crate::loops`]; queries read the store and the instance manager
//! directly and may observe slightly stale state.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for the lifecycle state and the receivers
//! handed to the loops at start. Both are taken and released without any
//! `.await` inside the lock scope.

use crate::collaborators::Collaborators;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult, FatalError};
use crate::lifecycle::LifecycleState;
use crate::loops::{self, LoopReceivers};
use crate::protocol::{
    round_trip, CreateFinalityProviderParams, CreateFinalityProviderRequest,
    FinalityProviderRegisteredEvent, RegisterFinalityProviderRequest,
    RegisterFinalityProviderResponse,
};
use crate::status_sync::sync_status_once;
use crate::tasks::TaskRegistry;
use crate::workflows::{create, register};
use fp_core::effects::InstanceInfo;
use fp_core::{BtcPublicKey, FinalityProviderInfo};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

struct Inner {
    config: AppConfig,
    deps: Collaborators,
    create_tx: mpsc::Sender<CreateFinalityProviderRequest>,
    register_tx: mpsc::Sender<RegisterFinalityProviderRequest>,
    registered_tx: mpsc::Sender<FinalityProviderRegisteredEvent>,
    receivers: Mutex<Option<LoopReceivers>>,
    fatal_tx: mpsc::UnboundedSender<FatalError>,
    fatal_rx: Mutex<Option<mpsc::UnboundedReceiver<FatalError>>>,
    lifecycle: Mutex<LifecycleState>,
    tasks: TaskRegistry,
}

/// Lifecycle coordinator for the locally managed finality providers.
///
/// Cheap to clone; every clone drives the same actor.
#[derive(Clone)]
pub struct FinalityProviderApp {
    inner: Arc<Inner>,
}

impl FinalityProviderApp {
    /// Build the actor. No loop runs until [`start`](Self::start).
    pub fn new(config: AppConfig, deps: Collaborators) -> AppResult<Self> {
        config.validate()?;

        let (create_tx, create_rx) = mpsc::channel(config.request_queue_capacity);
        let (register_tx, register_rx) = mpsc::channel(config.request_queue_capacity);
        let (registered_tx, registered_rx) = mpsc::channel(config.event_queue_capacity);
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                deps,
                create_tx,
                register_tx,
                registered_tx,
                receivers: Mutex::new(Some(LoopReceivers {
                    create_rx,
                    register_rx,
                    registered_rx,
                })),
                fatal_tx,
                fatal_rx: Mutex::new(Some(fatal_rx)),
                lifecycle: Mutex::new(LifecycleState::NotStarted),
                tasks: TaskRegistry::new(),
            }),
        })
    }

    /// Launch the event, registration, status sync and metrics loops.
    ///
    /// Fails with [`AppError::AlreadyStarted`] on any call after the first.
    pub async fn start(&self) -> AppResult<()> {
        self.inner.lifecycle.lock().begin_start()?;
        let receivers = self
            .inner
            .receivers
            .lock()
            .take()
            .ok_or(AppError::AlreadyStarted)?;

        tracing::info!("starting finality provider app");
        let inner = &self.inner;
        let LoopReceivers {
            create_rx,
            register_rx,
            registered_rx,
        } = receivers;

        inner.tasks.spawn(
            "event_loop",
            loops::run_event_loop(
                inner.deps.clone(),
                create_rx,
                registered_rx,
                inner.fatal_tx.clone(),
                inner.tasks.trigger(),
                inner.tasks.subscribe(),
            ),
        );
        inner.tasks.spawn(
            "registration_loop",
            loops::run_registration_loop(
                inner.deps.clone(),
                register_rx,
                inner.registered_tx.clone(),
                inner.tasks.subscribe(),
            ),
        );

        let deps = inner.deps.clone();
        inner.tasks.spawn_interval_until(
            "status_sync_loop",
            inner.config.sync_status_interval(),
            move || {
                let deps = deps.clone();
                async move { loops::status_sync_tick(&deps).await }
            },
        );

        let deps = inner.deps.clone();
        inner.tasks.spawn_interval_until(
            "metrics_loop",
            inner.config.metrics_update_interval(),
            move || {
                let deps = deps.clone();
                async move { loops::metrics_tick(&deps).await }
            },
        );

        tracing::info!("finality provider app started");
        Ok(())
    }

    /// Signal shutdown, wait for every loop, then stop the voting instances
    /// and close the signer connection, in that order.
    ///
    /// Fails with [`AppError::AlreadyStopped`] on any call after the first.
    pub async fn stop(&self) -> AppResult<()> {
        self.inner.lifecycle.lock().begin_stop()?;

        tracing::info!("stopping finality provider app");
        self.inner.tasks.signal_shutdown();
        self.inner.tasks.join_all().await;

        tracing::debug!("stopping finality provider instances");
        self.inner.deps.instances.stop().await?;

        tracing::debug!("closing signer connection");
        self.inner.deps.signer.close().await?;

        tracing::info!("finality provider app stopped");
        Ok(())
    }

    /// Create a new provider in status `CREATED`.
    pub async fn create_finality_provider(
        &self,
        params: CreateFinalityProviderParams,
    ) -> AppResult<FinalityProviderInfo> {
        round_trip(
            &self.inner.create_tx,
            |responder| CreateFinalityProviderRequest { params, responder },
            self.inner.tasks.subscribe(),
        )
        .await
    }

    /// Register a `CREATED` provider on chain.
    pub async fn register_finality_provider(
        &self,
        btc_pk_hex: &str,
    ) -> AppResult<RegisterFinalityProviderResponse> {
        let btc_pk = BtcPublicKey::from_hex(btc_pk_hex)?;
        let record = self.inner.deps.store.get(&btc_pk).await?;
        register::ensure_registrable(&record)?;

        round_trip(
            &self.inner.register_tx,
            |responder| RegisterFinalityProviderRequest { record, responder },
            self.inner.tasks.subscribe(),
        )
        .await
    }

    /// Run one status sync pass now; returns whether any instance is running.
    pub async fn sync_status(&self) -> AppResult<bool> {
        sync_status_once(&self.inner.deps).await
    }

    /// Sign `msg` with the chain key `key_name`, creating the key if absent.
    pub async fn sign_raw_message(
        &self,
        key_name: &str,
        passphrase: &str,
        hd_path: &str,
        msg: &[u8],
    ) -> AppResult<Vec<u8>> {
        create::load_or_create_chain_key(&self.inner.deps, key_name, passphrase, hd_path).await?;
        Ok(self.inner.deps.keyring.sign(key_name, passphrase, msg).await?)
    }

    /// Public view of every stored provider.
    pub async fn list_all_finality_providers_info(&self) -> AppResult<Vec<FinalityProviderInfo>> {
        let records = self.inner.deps.store.list_all().await?;
        Ok(records.iter().map(|r| r.to_info()).collect())
    }

    /// Public view of one stored provider.
    pub async fn finality_provider_info(
        &self,
        btc_pk: &BtcPublicKey,
    ) -> AppResult<FinalityProviderInfo> {
        Ok(self.inner.deps.store.get(btc_pk).await?.to_info())
    }

    /// Voting instances known to the instance manager.
    pub fn list_finality_provider_instances(&self) -> Vec<InstanceInfo> {
        self.inner.deps.instances.list()
    }

    /// Start the voting instance for one provider.
    pub async fn start_handling_finality_provider(
        &self,
        btc_pk: &BtcPublicKey,
        passphrase: &str,
    ) -> AppResult<()> {
        self.inner.deps.instances.start(btc_pk, passphrase).await?;
        tracing::info!(btc_pk = %btc_pk, "started handling finality provider");
        Ok(())
    }

    /// Start voting instances for every eligible provider.
    pub async fn start_handling_all(&self) -> AppResult<()> {
        Ok(self.inner.deps.instances.start_all().await?)
    }

    /// Receiver of fatal errors; `None` after the first call.
    pub fn take_fatal_errors(&self) -> Option<mpsc::UnboundedReceiver<FatalError>> {
        self.inner.fatal_rx.lock().take()
    }

    /// Current lifecycle state.
    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.inner.lifecycle.lock()
    }

    /// Configuration the actor was built with.
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for FinalityProviderApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinalityProviderApp")
            .field("state", &self.lifecycle_state())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
