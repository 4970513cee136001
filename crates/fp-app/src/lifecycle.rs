//! Start/stop state of the application actor.

use crate::errors::{AppError, AppResult};
use std::fmt;

/// Lifecycle of the application actor.
///
/// Transitions are one-way: `NotStarted -> Running -> Stopped`, or
/// `NotStarted -> Stopped` when the app is stopped without ever running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed, no loops launched
    #[default]
    NotStarted,
    /// Worker loops running
    Running,
    /// Torn down; cannot be restarted
    Stopped,
}

impl LifecycleState {
    /// Move to `Running`, or fail if the app was ever started or stopped.
    pub(crate) fn begin_start(&mut self) -> AppResult<()> {
        match self {
            LifecycleState::NotStarted => {
                *self = LifecycleState::Running;
                Ok(())
            }
            LifecycleState::Running | LifecycleState::Stopped => Err(AppError::AlreadyStarted),
        }
    }

    /// Move to `Stopped`, or fail if teardown already happened.
    pub(crate) fn begin_stop(&mut self) -> AppResult<()> {
        match self {
            LifecycleState::NotStarted | LifecycleState::Running => {
                *self = LifecycleState::Stopped;
                Ok(())
            }
            LifecycleState::Stopped => Err(AppError::AlreadyStopped),
        }
    }

    /// Whether the worker loops are running
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::NotStarted => "not_started",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
