//! # FP App - Finality Provider Application Actor
//!
//! Coordinates the lifecycle of locally managed finality providers: key
//! bootstrap and proof-of-possession, on-chain registration, status
//! reconciliation against voting power, and orderly start/stop of the
//! subsystems around them.
//!
//! ## Architecture
//!
//! ```text
//! callers ──> protocol (request + one-shot reply) ──> worker loops
//!                                                      ├── event loop        (create, persist REGISTERED)
//!                                                      ├── registration loop (registration tx)
//!                                                      ├── status sync loop  (voting power -> status)
//!                                                      └── metrics loop      (snapshot export)
//! ```
//!
//! All loops share one shutdown broadcast owned by the task registry.
//! Collaborators are injected as trait objects from `fp_core::effects`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = FinalityProviderApp::new(AppConfig::default(), collaborators)?;
//! app.start().await?;
//! let info = app
//!     .create_finality_provider(CreateFinalityProviderParams::new(
//!         "alice",
//!         "test-1",
//!         Description::with_moniker("alice"),
//!         Decimal::new(5, 2),
//!     ))
//!     .await?;
//! app.register_finality_provider(&info.btc_pk_hex).await?;
//! app.stop().await?;
//! ```

mod app;
mod collaborators;
pub mod config;
pub mod errors;
pub mod lifecycle;
mod loops;
pub mod metrics;
pub mod protocol;
mod status_sync;
pub mod tasks;
mod workflows;

pub use app::FinalityProviderApp;
pub use collaborators::Collaborators;
pub use config::{AppConfig, MetricsConfig};
pub use errors::{AppError, AppResult, FatalError};
pub use lifecycle::LifecycleState;
pub use metrics::FpMetrics;
pub use protocol::{CreateFinalityProviderParams, RegisterFinalityProviderResponse};
