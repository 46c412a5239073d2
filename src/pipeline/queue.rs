//! Bounded handoff queue between the scanner and the analyzers.
//!
//! Capacity equals the consumer count: a full queue means every consumer is busy,
//! and the scanner blocks on `put` until one frees up. Both blocking calls can be
//! interrupted by a [`CancelToken`]; an interrupted call leaves the queue untouched.

use crossbeam_channel::{Receiver, Sender, bounded, select};

use super::cancel::CancelToken;
use crate::FileTask;
use crate::error::QueueError;

/// Fixed-capacity FIFO of [`FileTask`]s. Share it behind an `Arc`.
pub struct HandoffQueue {
    sender: Sender<FileTask>,
    receiver: Receiver<FileTask>,
    capacity: usize,
}

impl HandoffQueue {
    /// Create a queue holding at most `capacity` items (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Enqueue `item`, blocking while the queue is full.
    ///
    /// Returns [`QueueError::Cancelled`] if `cancel` fires first (or had already fired);
    /// the item is then dropped and the queue is unchanged.
    pub fn put(&self, item: FileTask, cancel: &CancelToken) -> Result<(), QueueError> {
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        select! {
            send(self.sender, item) -> res => res.map_err(|_| QueueError::Disconnected),
            recv(cancel.signal()) -> _ => Err(QueueError::Cancelled),
        }
    }

    /// Dequeue the oldest item, blocking while the queue is empty.
    ///
    /// Returns [`QueueError::Cancelled`] if `cancel` fires first (or had already fired).
    pub fn take(&self, cancel: &CancelToken) -> Result<FileTask, QueueError> {
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        select! {
            recv(self.receiver) -> msg => msg.map_err(|_| QueueError::Disconnected),
            recv(cancel.signal()) -> _ => Err(QueueError::Cancelled),
        }
    }

    /// Items currently queued. Never exceeds [`Self::capacity`].
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.receiver.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
