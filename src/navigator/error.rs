//! Navigation error types.

use crate::cancel::Canceled;
use crate::lifecycle::{BoxError, LifecycleError};
use thiserror::Error;

/// Errors surfaced by [`Navigator`](super::Navigator) operations
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The builder could not resolve an entry; the stack is unchanged
    #[error("Failed to build screen for stack '{stack}': {source}")]
    Build {
        stack: String,
        #[source]
        source: BoxError,
    },

    /// A lifecycle phase failed or the entry was disposed mid-transition
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The caller's wait was abandoned
    #[error(transparent)]
    Canceled(#[from] Canceled),

    #[error("Entry '{id}' is already on stack '{stack}'")]
    DuplicateId { stack: String, id: String },

    #[error("Stack '{stack}' is full ({max_depth} entries)")]
    StackFull { stack: String, max_depth: usize },

    #[error("Navigator '{stack}' has been shut down")]
    ShutDown { stack: String },

    #[error("Entry '{id}' holds a {actual}, not a {expected}")]
    UnexpectedScreenType {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl NavigationError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }

    /// A lifecycle phase body returned an error.
    pub fn is_phase_failure(&self) -> bool {
        matches!(self, Self::Lifecycle(LifecycleError::PhaseFailed { .. }))
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Lifecycle(err) if err.is_disposed())
    }
}
