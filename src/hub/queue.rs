//! Outbound Queue
//!
//! Bounded per-connection buffer between the hub loop (non-blocking
//! producer) and a connection's outbound pump (blocking consumer).
//!
//! The producer side is a cloneable handle so the same connection can be
//! referred to from several places, but the underlying channel sender lives
//! in exactly one slot. Closing takes it out of that slot, so a queue can be
//! closed at most once and nothing can be enqueued afterwards.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;

use super::message::Message;

/// Why a non-blocking enqueue was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The queue is at capacity
    #[error("outbound queue is full")]
    Full,

    /// The queue was closed, or its consumer has gone away
    #[error("outbound queue is closed")]
    Closed,
}

/// Producer handle for one connection's outbound queue
#[derive(Clone)]
pub struct OutboundQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    sender: Mutex<Option<mpsc::Sender<Message>>>,
    capacity: usize,
}

/// Consumer half, owned by the connection's outbound pump
pub struct OutboundReceiver {
    rx: mpsc::Receiver<Message>,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` pending messages
    ///
    /// A capacity of zero is raised to one.
    pub fn bounded(capacity: usize) -> (OutboundQueue, OutboundReceiver) {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        let queue = OutboundQueue {
            inner: Arc::new(QueueInner {
                sender: Mutex::new(Some(tx)),
                capacity,
            }),
        };

        (queue, OutboundReceiver { rx })
    }

    /// Enqueue without waiting
    pub fn try_enqueue(&self, message: Message) -> Result<(), EnqueueError> {
        let sender = self.sender();
        let tx = sender.as_ref().ok_or(EnqueueError::Closed)?;

        tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Close the queue
    ///
    /// Returns `true` only for the call that actually closed it. Messages
    /// already enqueued stay readable by the receiver.
    pub fn close(&self) -> bool {
        self.sender().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.sender().is_none()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<Message>>> {
        self.inner
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for OutboundQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundQueue")
            .field("capacity", &self.inner.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl OutboundReceiver {
    /// Wait for the next message
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take the next message if one is ready
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_queue_rejects() {
        let (queue, _rx) = OutboundQueue::bounded(2);

        assert!(queue.try_enqueue(Message::from("a")).is_ok());
        assert!(queue.try_enqueue(Message::from("b")).is_ok());
        assert_eq!(
            queue.try_enqueue(Message::from("c")),
            Err(EnqueueError::Full)
        );
    }

    #[test]
    fn test_close_only_once() {
        let (queue, _rx) = OutboundQueue::bounded(4);
        let other = queue.clone();

        assert!(queue.close());
        assert!(!queue.close());
        assert!(!other.close());
        assert!(other.is_closed());
        assert_eq!(
            other.try_enqueue(Message::from("late")),
            Err(EnqueueError::Closed)
        );
    }

    #[tokio::test]
    async fn test_drains_after_close() {
        let (queue, mut rx) = OutboundQueue::bounded(4);
        queue.try_enqueue(Message::from("one")).unwrap();
        queue.try_enqueue(Message::from("two")).unwrap();
        queue.close();

        assert_eq!(rx.recv().await, Some(Message::from("one")));
        assert_eq!(rx.recv().await, Some(Message::from("two")));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_dropped_receiver_reports_closed() {
        let (queue, rx) = OutboundQueue::bounded(4);
        drop(rx);

        assert_eq!(
            queue.try_enqueue(Message::from("x")),
            Err(EnqueueError::Closed)
        );
        // The sender slot is still occupied until the hub closes it.
        assert!(queue.close());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (queue, _rx) = OutboundQueue::bounded(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.try_enqueue(Message::from("x")).is_ok());
    }
}
