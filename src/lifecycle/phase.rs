//! Lifecycle phases of a screen entry.
//!
//! A [`Phase`] names the last lifecycle step an entry completed. The legal
//! order between phases is a pure predicate, [`Phase::can_advance_to`], so
//! the controller can refuse out-of-order requests without side effects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last completed lifecycle step of an entry.
///
/// A pushed entry walks `Created → Initialized → WillPushEnter →
/// DidPushEnter`. While active it may be covered (`WillPushExit →
/// DidPushExit`) and later revealed again (`WillPopEnter → DidPopEnter`).
/// It leaves the stack through `WillPopExit → DidPopExit → Cleanup`, and
/// every path ends in `Disposed`.
///
/// # Example
///
/// ```rust
/// use screenstack::Phase;
///
/// assert!(Phase::Created.can_advance_to(Phase::Initialized));
/// assert!(!Phase::Created.can_advance_to(Phase::DidPushEnter));
/// assert!(Phase::DidPushEnter.is_active());
/// assert!(Phase::Disposed.is_final());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Created,
    Initialized,
    WillPushEnter,
    DidPushEnter,
    WillPushExit,
    DidPushExit,
    WillPopEnter,
    DidPopEnter,
    WillPopExit,
    DidPopExit,
    Cleanup,
    Disposed,
}

impl Phase {
    /// Get the phase's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Initialized => "Initialized",
            Self::WillPushEnter => "WillPushEnter",
            Self::DidPushEnter => "DidPushEnter",
            Self::WillPushExit => "WillPushExit",
            Self::DidPushExit => "DidPushExit",
            Self::WillPopEnter => "WillPopEnter",
            Self::DidPopEnter => "DidPopEnter",
            Self::WillPopExit => "WillPopExit",
            Self::DidPopExit => "DidPopExit",
            Self::Cleanup => "Cleanup",
            Self::Disposed => "Disposed",
        }
    }

    /// Terminal phase; nothing may follow it.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// The entry is the active (topmost, fully entered) screen.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::DidPushEnter | Self::DidPopEnter)
    }

    /// Completing this phase makes the entry active and opens its exit scope.
    pub fn activates(&self) -> bool {
        self.is_active()
    }

    /// Starting this phase cancels the entry's exit scope.
    pub fn begins_exit(&self) -> bool {
        matches!(self, Self::WillPushExit | Self::WillPopExit)
    }

    /// Pure check of the lifecycle order.
    ///
    /// Disposal is legal from every phase except `Disposed` itself. Cleanup
    /// is legal before the entry was ever entered (a failed push), after it
    /// was covered (an entry that is not kept in history) and after it was
    /// popped.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        use Phase::*;

        if self.is_final() {
            return false;
        }

        matches!(
            (*self, next),
            (_, Disposed)
                | (Created, Initialized)
                | (Initialized, WillPushEnter)
                | (WillPushEnter, DidPushEnter)
                | (DidPushEnter | DidPopEnter, WillPushExit | WillPopExit)
                | (WillPushExit, DidPushExit)
                | (DidPushExit, WillPopEnter)
                | (WillPopEnter, DidPopEnter)
                | (WillPopExit, DidPopExit)
                | (Created | Initialized | DidPushExit | DidPopExit, Cleanup)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
