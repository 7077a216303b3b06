//! Unbounded single-consumer event channel.
//!
//! Many producers hold an [`EventSender`]; exactly one [`EventReader`]
//! drains messages in the order they were appended. Sending never blocks
//! and never fails for capacity reasons. Once the channel is closed, later
//! sends are rejected and the reader ends after draining what was buffered.

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc;

/// A send was rejected because the channel is closed. Carries the message
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event channel is closed")]
pub struct ChannelClosed<T>(pub T);

/// Create a connected sender/reader pair.
///
/// # Example
///
/// ```rust
/// use screenstack::channel::event_channel;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let (sender, mut reader) = event_channel();
/// sender.send(1).unwrap();
/// sender.send(2).unwrap();
/// sender.close();
///
/// assert_eq!(reader.next().await, Some(1));
/// assert_eq!(reader.next().await, Some(2));
/// assert_eq!(reader.next().await, None);
/// assert!(sender.send(3).is_err());
/// # });
/// ```
pub fn event_channel<T>() -> (EventSender<T>, EventReader<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sender = EventSender {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    (sender, EventReader { rx })
}

/// Producer half. Clones share the same channel.
#[derive(Debug)]
pub struct EventSender<T> {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<T>>>>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> EventSender<T> {
    /// Append a message.
    pub fn send(&self, message: T) -> Result<(), ChannelClosed<T>> {
        let guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_ref() {
            Some(tx) => tx.send(message).map_err(|err| ChannelClosed(err.0)),
            None => Err(ChannelClosed(message)),
        }
    }

    /// Stop accepting messages. Buffered messages are still delivered.
    pub fn close(&self) {
        let mut guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    pub fn is_closed(&self) -> bool {
        let guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map_or(true, mpsc::UnboundedSender::is_closed)
    }
}

/// The single consumer half.
#[derive(Debug)]
pub struct EventReader<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> EventReader<T> {
    /// Next message in arrival order.
    ///
    /// Returns `None` once the channel is closed and drained; until then it
    /// waits for the next message.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next buffered message without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
