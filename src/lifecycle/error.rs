//! Lifecycle error types.

use super::phase::Phase;
use thiserror::Error;

/// Error type screens and builders report their own failures with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while driving an entry's lifecycle
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The controller was disposed; its scopes and screen are gone
    #[error("Entry '{id}' is disposed")]
    Disposed { id: String },

    /// The requested phase does not follow the current one
    #[error("Entry '{id}' cannot advance from {from} to {to}")]
    IllegalTransition { id: String, from: Phase, to: Phase },

    /// Another phase of the same entry is still running
    #[error("Entry '{id}' is still running {running}")]
    PhaseInProgress { id: String, running: Phase },

    /// The screen's hook for `phase` returned an error
    #[error("Entry '{id}' failed during {phase}: {source}")]
    PhaseFailed {
        id: String,
        phase: Phase,
        #[source]
        source: BoxError,
    },
}

impl LifecycleError {
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }
}
