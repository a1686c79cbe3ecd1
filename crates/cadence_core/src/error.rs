//! Error types shared by the scheduler and the action runtime

use thiserror::Error;

use crate::target::Capability;

/// Errors raised while ticking timers or running actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// The owner does not expose a capability the action mutates
    #[error("{action} needs a {capability} owner")]
    MissingCapability {
        action: &'static str,
        capability: Capability,
    },

    /// The owner is already borrowed elsewhere while the action mutates it
    #[error("owner of {action} is already borrowed")]
    TargetBusy { action: &'static str },

    /// An action handle was borrowed again while the manager stepped it
    #[error("action is already borrowed")]
    ActionBusy,

    /// `update` was called without a run owner bound
    #[error("{action} is not running")]
    NotRunning { action: &'static str },

    /// A timer was fired from inside its own callback
    #[error("timer fired re-entrantly from its own callback")]
    TimerBusy,
}

/// Result type for scheduler and action operations
pub type Result<T> = std::result::Result<T, CadenceError>;
