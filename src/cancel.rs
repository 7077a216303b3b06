//! Hierarchical cancellation scopes.
//!
//! A [`CancelScope`] owns a one-shot "stop now" flag. Scopes form a tree:
//! cancelling a scope cancels every descendant immediately, while cancelling
//! a child never reaches its parent or siblings. Code that only needs to
//! observe cancellation holds a [`CancelSignal`], a cheap read-only clone of
//! the scope's flag.
//!
//! # Example
//!
//! ```rust
//! use screenstack::cancel::CancelScope;
//!
//! let parent = CancelScope::new();
//! let child = parent.child();
//! let signal = child.signal();
//!
//! assert!(!signal.is_cancelled());
//! parent.cancel();
//! assert!(signal.is_cancelled());
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use thiserror::Error;
use tokio::sync::Notify;

/// Outcome of a wait that was abandoned because its signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation was canceled")]
pub struct Canceled;

#[derive(Debug, Default)]
struct Node {
    cancelled: AtomicBool,
    notify: Notify,
    children: Mutex<Vec<Weak<Node>>>,
}

impl Node {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.notify.notify_waiters();

        let children = match self.children.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn attach(&self, child: &Arc<Node>) {
        let mut children = match self.children.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Checked under the lock so a concurrent cancel either sees the new
        // child or the child sees the cancelled flag.
        if self.is_cancelled() {
            drop(children);
            child.cancel();
            return;
        }
        children.retain(|weak| weak.strong_count() > 0);
        children.push(Arc::downgrade(child));
    }
}

/// Owner of a cancellation flag.
///
/// Dropping a scope cancels it, so a scope can never be left dangling.
#[derive(Debug)]
pub struct CancelScope {
    node: Arc<Node>,
}

impl CancelScope {
    /// Create a root scope with no parent.
    pub fn new() -> Self {
        Self {
            node: Arc::new(Node::default()),
        }
    }

    /// Create a child scope.
    ///
    /// A child of an already-cancelled scope starts out cancelled.
    pub fn child(&self) -> CancelScope {
        self.signal().child()
    }

    /// Read-only view of this scope's flag.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            node: Arc::clone(&self.node),
        }
    }

    /// Cancel this scope and all of its descendants. Idempotent.
    pub fn cancel(&self) {
        self.node.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.node.is_cancelled()
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.node.cancel();
    }
}

/// Read-only handle observing a [`CancelScope`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    node: Arc<Node>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            node: Arc::new(Node::default()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.node.is_cancelled()
    }

    /// Create a new scope that is cancelled whenever this signal fires.
    ///
    /// This lets holders of a read-only signal derive narrower scopes
    /// without being able to cancel the original.
    pub fn child(&self) -> CancelScope {
        let child = Arc::new(Node::default());
        self.node.attach(&child);
        CancelScope { node: child }
    }

    /// Create a new scope cancelled when either this signal or `other` fires.
    pub fn linked_with(&self, other: &CancelSignal) -> CancelScope {
        let linked = self.child();
        other.node.attach(&linked.node);
        linked
    }

    /// Resolve once the signal has fired.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.node.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Fail fast if the signal has already fired.
    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_cancelled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    /// Run `fut` unless the signal fires first.
    ///
    /// The future is dropped on cancellation. A signal that has already fired
    /// wins even if `fut` would complete immediately.
    pub async fn run_until_cancelled<F>(&self, fut: F) -> Result<F::Output, Canceled>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            () = self.cancelled() => Err(Canceled),
            output = fut => Ok(output),
        }
    }
}
