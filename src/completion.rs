//! One-shot completion signal.
//!
//! A screen that wants to be removed when it is done exposes a
//! [`CompletionSignal`] and resolves it from its own logic. Anyone holding a
//! clone can wait for it with their own cancellation signal.

use crate::cancel::{CancelSignal, Canceled};
use std::sync::Arc;
use tokio::sync::watch;

/// One-shot, idempotent "this screen is finished" flag.
///
/// Clones share the same underlying flag.
///
/// # Example
///
/// ```rust
/// use screenstack::CompletionSignal;
///
/// let signal = CompletionSignal::new();
/// assert!(signal.resolve());
/// assert!(!signal.resolve());
/// assert!(signal.is_resolved());
/// ```
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    state: Arc<watch::Sender<bool>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Resolve the signal.
    ///
    /// Returns `true` only for the call that actually resolved it; every
    /// later or concurrent call is a no-op returning `false`.
    pub fn resolve(&self) -> bool {
        self.state.send_if_modified(|resolved| {
            if *resolved {
                false
            } else {
                *resolved = true;
                true
            }
        })
    }

    pub fn is_resolved(&self) -> bool {
        *self.state.borrow()
    }

    /// Wait for resolution, or fail with [`Canceled`] if `cancel` fires first.
    ///
    /// Cancelling a wait leaves the signal untouched for other waiters.
    pub async fn wait(&self, cancel: &CancelSignal) -> Result<(), Canceled> {
        let mut rx = self.state.subscribe();
        cancel
            .run_until_cancelled(async move {
                // The sender lives as long as `self`, so this never errors.
                let _ = rx.wait_for(|resolved| *resolved).await;
            })
            .await
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelScope;
    use std::time::Duration;

    #[test]
    fn starts_unresolved() {
        assert!(!CompletionSignal::new().is_resolved());
    }

    #[test]
    fn only_first_resolve_has_effect() {
        let signal = CompletionSignal::new();
        let clone = signal.clone();

        assert!(signal.resolve());
        assert!(!clone.resolve());
        assert!(!signal.resolve());
        assert!(clone.is_resolved());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_resolved() {
        let signal = CompletionSignal::new();
        signal.resolve();
        assert_eq!(signal.wait(&CancelSignal::never()).await, Ok(()));
    }

    #[tokio::test]
    async fn all_waiters_observe_single_resolution() {
        let signal = CompletionSignal::new();
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.wait(&CancelSignal::never()).await })
            })
            .collect();

        tokio::task::yield_now().await;
        signal.resolve();
        signal.resolve();

        for waiter in waiters {
            let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(outcome, Ok(()));
        }
    }

    #[tokio::test]
    async fn canceled_wait_leaves_signal_unresolved() {
        let signal = CompletionSignal::new();
        let scope = CancelScope::new();
        scope.cancel();

        assert_eq!(signal.wait(&scope.signal()).await, Err(Canceled));
        assert!(!signal.is_resolved());

        signal.resolve();
        assert_eq!(signal.wait(&CancelSignal::never()).await, Ok(()));
    }
}
