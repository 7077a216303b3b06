//! The transition lock that serializes stack mutations.

use crate::cancel::{CancelSignal, Canceled};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Busy flag guarding a stack's transitions.
///
/// Waiters suspend until the holder releases, then race to re-acquire. Which
/// waiter wins is unspecified; the only guarantee is that two holders never
/// overlap.
///
/// # Example
///
/// ```rust
/// use screenstack::TransitionLock;
/// use std::sync::Arc;
///
/// let lock = Arc::new(TransitionLock::new());
/// let guard = lock.try_acquire().unwrap();
/// assert!(lock.is_busy());
/// assert!(lock.try_acquire().is_none());
///
/// drop(guard);
/// assert!(!lock.is_busy());
/// ```
#[derive(Debug, Default)]
pub struct TransitionLock {
    busy: AtomicBool,
    released: Notify,
}

impl TransitionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transition currently holds the lock.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Take the lock if it is free.
    pub fn try_acquire(self: &Arc<Self>) -> Option<TransitionGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| TransitionGuard {
                lock: Arc::clone(self),
            })
    }

    /// Wait for the lock, or fail with [`Canceled`] if `cancel` fires first.
    pub async fn acquire(
        self: &Arc<Self>,
        cancel: &CancelSignal,
    ) -> Result<TransitionGuard, Canceled> {
        loop {
            cancel.check()?;

            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if let Some(guard) = self.try_acquire() {
                return Ok(guard);
            }
            cancel.run_until_cancelled(released).await?;
        }
    }

    /// Wait until no transition holds the lock, without taking it.
    pub async fn settled(&self, cancel: &CancelSignal) -> Result<(), Canceled> {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if !self.is_busy() {
                return Ok(());
            }
            cancel.run_until_cancelled(released).await?;
        }
    }
}

/// Proof of holding a [`TransitionLock`]; releases it on drop.
#[derive(Debug)]
pub struct TransitionGuard {
    lock: Arc<TransitionLock>,
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::SeqCst);
        self.lock.released.notify_waiters();
    }
}
