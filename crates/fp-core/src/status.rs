//! Finality provider status state machine.
//!
//! ```text
//! CREATED ──> REGISTERED ──> ACTIVE <──> INACTIVE
//!                 │             │            │
//!                 └─────────────┴────────────┴──> SLASHED (reported by the chain)
//! ```
//!
//! Transitions driven by this crate are pure functions of the current status
//! and the voting power the chain reports for the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a finality provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalityProviderStatus {
    /// Keys and proof-of-possession exist locally; not yet on chain
    Created,
    /// Registration transaction accepted, no voting power yet
    Registered,
    /// Provider has voting power at the latest height
    Active,
    /// Provider lost its voting power
    Inactive,
    /// Provider was slashed; terminal
    Slashed,
}

impl FinalityProviderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [FinalityProviderStatus; 5] = [
        FinalityProviderStatus::Created,
        FinalityProviderStatus::Registered,
        FinalityProviderStatus::Active,
        FinalityProviderStatus::Inactive,
        FinalityProviderStatus::Slashed,
    ];

    /// Upper-case name used in logs, metrics labels and the info view.
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalityProviderStatus::Created => "CREATED",
            FinalityProviderStatus::Registered => "REGISTERED",
            FinalityProviderStatus::Active => "ACTIVE",
            FinalityProviderStatus::Inactive => "INACTIVE",
            FinalityProviderStatus::Slashed => "SLASHED",
        }
    }

    /// Whether the status should be re-evaluated against the given voting power.
    ///
    /// Positive voting power is always evaluated. At zero power only `CREATED`
    /// and `ACTIVE` providers are evaluated: a provider that never registered or
    /// already fell inactive is not polled for a redundant zero result.
    /// `SLASHED` is terminal and never re-evaluated.
    pub fn should_sync(&self, voting_power: u64) -> bool {
        if *self == FinalityProviderStatus::Slashed {
            return false;
        }
        if voting_power > 0 {
            return true;
        }
        matches!(
            self,
            FinalityProviderStatus::Created | FinalityProviderStatus::Active
        )
    }

    /// Next status given the voting power reported by the chain.
    ///
    /// Only meaningful when [`should_sync`](Self::should_sync) holds.
    pub fn reconcile(&self, voting_power: u64) -> FinalityProviderStatus {
        if voting_power > 0 {
            return FinalityProviderStatus::Active;
        }
        match self {
            FinalityProviderStatus::Created => FinalityProviderStatus::Registered,
            FinalityProviderStatus::Active => FinalityProviderStatus::Inactive,
            other => *other,
        }
    }

    /// Whether a voting instance may run for a provider in this status.
    pub fn should_start(&self) -> bool {
        !matches!(
            self,
            FinalityProviderStatus::Created | FinalityProviderStatus::Slashed
        )
    }
}

impl fmt::Display for FinalityProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown finality provider status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for FinalityProviderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FinalityProviderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
