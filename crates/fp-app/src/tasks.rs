//! Task registry for the actor's worker loops.
//!
//! Tracks spawned loops and owns the shutdown broadcast they observe.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for JoinHandle storage because:
//! 1. Operations are O(1) push or O(n) drain (shutdown only)
//! 2. Lock is never held across `.await` points
//! 3. No I/O or async work inside lock scope

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Receiving side of the shutdown broadcast.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once shutdown is signaled (or the registry is gone).
    ///
    /// Cancel safe; returns immediately if shutdown already happened.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Whether shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Sending side of the shutdown broadcast, handed to loops that may need to
/// bring the whole actor down.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    /// Broadcast shutdown to every subscriber.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Spawned worker loops plus the shutdown broadcast they share.
#[derive(Debug)]
pub struct TaskRegistry {
    shutdown_tx: Arc<watch::Sender<bool>>,
    handles: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl TaskRegistry {
    /// Empty registry with shutdown not yet signaled.
    pub fn new() -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Handle that signals shutdown without owning the registry.
    pub fn trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// New receiver for the shutdown broadcast.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.shutdown_tx.subscribe(),
        }
    }

    /// Spawn a loop that observes the shutdown signal on its own.
    pub fn spawn<F>(&self, name: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.handles.lock().push((name, handle));
    }

    /// Run `f` every `period` until it returns `false` or shutdown is signaled.
    ///
    /// The first call happens one full period after spawning.
    pub fn spawn_interval_until<F, Fut>(&self, name: &'static str, period: Duration, mut f: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut shutdown = self.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        if !f().await {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(task = name, "interval task exited");
        });
        self.handles.lock().push((name, handle));
    }

    /// Broadcast shutdown to every subscriber.
    pub fn signal_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Whether shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Wait for every spawned task to finish.
    pub async fn join_all(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "task terminated abnormally");
            }
        }
    }

    /// Number of tasks not yet joined
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Whether no tasks are pending
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskRegistry {
    fn drop(&mut self) {
        self.shutdown_tx.send_replace(true);
        for (_, handle) in self.handles.lock().drain(..) {
            handle.abort();
        }
    }
}
