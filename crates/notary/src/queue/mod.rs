//! Blocking FIFO conduit between pipeline stages.
//!
//! A [`MessageQueue`] is a cloneable handle over a Tokio MPSC channel. Any
//! number of handles may `put`, and any number may `get`: consumers take turns
//! on the receiver behind an async mutex, the same way the indexing pipeline
//! shares one receiver among a pool of readers.
//!
//! End-of-stream is explicit. `close` drops the queue's own sender, which
//! lets the channel report `None` once every buffered item has been received.
//! Closing twice, or putting after the close, is a protocol violation and is
//! reported as an [`Error`] instead of being silently tolerated.


use crate::{Error, Result};
use parking_lot::Mutex;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

/// Lifecycle of a [`MessageQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting items.
    Open,
    /// `close` has been called but buffered items have not all been received.
    Closing,
    /// A consumer observed end-of-stream.
    Closed,
}

enum Sender<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

// Derived `Clone` would require `T: Clone`.
impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Bounded(tx) => Self::Bounded(tx.clone()),
            Self::Unbounded(tx) => Self::Unbounded(tx.clone()),
        }
    }
}

enum Receiver<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

impl<T> Receiver<T> {
    async fn recv(&mut self) -> Option<T> {
        match self {
            Self::Bounded(rx) => rx.recv().await,
            Self::Unbounded(rx) => rx.recv().await,
        }
    }
}

struct Shared<T> {
    name: String,
    // `None` once closed. Puts clone the sender out of the slot so the lock is
    // never held across an await.
    tx: Mutex<Option<Sender<T>>>,
    rx: AsyncMutex<Receiver<T>>,
    drained: AtomicBool,
    close_calls: AtomicUsize,
    delivered: AtomicUsize,
}

/// A named, ordered, blocking queue with explicit end-of-stream.
///
/// Cloning the handle is cheap; all clones refer to the same queue.
pub struct MessageQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for MessageQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> core::fmt::Debug for MessageQueue<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("delivered", &self.delivered())
            .finish()
    }
}

impl<T: Send> MessageQueue<T> {
    /// Creates a queue that holds at most `capacity` items before `put`
    /// waits. A capacity of zero is rounded up to one.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self::from_parts(name.into(), Sender::Bounded(tx), Receiver::Bounded(rx))
    }

    /// Creates a queue on which `put` never waits.
    pub fn unbounded(name: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::from_parts(
            name.into(),
            Sender::Unbounded(tx),
            Receiver::Unbounded(rx),
        )
    }

    /// Creates a bounded queue for `Some(capacity)` and an unbounded one for
    /// `None`.
    pub fn with_capacity(name: impl Into<String>, capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(name, capacity),
            None => Self::unbounded(name),
        }
    }

    fn from_parts(name: String, tx: Sender<T>, rx: Receiver<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                name,
                tx: Mutex::new(Some(tx)),
                rx: AsyncMutex::new(rx),
                drained: AtomicBool::new(false),
                close_calls: AtomicUsize::new(0),
                delivered: AtomicUsize::new(0),
            }),
        }
    }

    /// Enqueues `item`, waiting while a bounded queue is full.
    ///
    /// Room is reserved first and the item is handed over under the same lock
    /// `close` takes, so a put that was still waiting for room when the queue
    /// was closed fails instead of slipping in behind end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PutAfterClose`] if `close` has been called, including
    /// while this put was waiting. The item is dropped.
    pub async fn put(&self, item: T) -> Result<()> {
        let tx = self.shared.tx.lock().clone();
        let Some(tx) = tx else {
            return Err(self.put_after_close());
        };

        // The receiver lives as long as `shared`, so a failed reserve or send
        // can only mean the channel was closed underneath us.
        let sent = match &tx {
            Sender::Bounded(tx) => match tx.reserve().await {
                Ok(permit) => {
                    let slot = self.shared.tx.lock();
                    if slot.is_some() {
                        permit.send(item);
                        true
                    } else {
                        false
                    }
                }
                Err(_) => false,
            },
            Sender::Unbounded(tx) => {
                let slot = self.shared.tx.lock();
                slot.is_some() && tx.send(item).is_ok()
            }
        };

        if !sent {
            return Err(self.put_after_close());
        }

        self.shared.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Dequeues the next item.
    ///
    /// Waits until an item is available or the queue has been closed and
    /// drained, in which case it returns `None`. Once `None` has been
    /// returned, every later call returns `None` as well.
    pub async fn get(&self) -> Option<T> {
        let mut rx = self.shared.rx.lock().await;
        let item = rx.recv().await;
        if item.is_none() {
            self.shared.drained.store(true, Ordering::Release);
        }
        item
    }

    /// Marks the end of the stream.
    ///
    /// Items already enqueued are still delivered; consumers see
    /// end-of-stream after the last of them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DoubleClose`] if the queue was already closed.
    pub fn close(&self) -> Result<()> {
        self.shared.close_calls.fetch_add(1, Ordering::AcqRel);
        match self.shared.tx.lock().take() {
            Some(_tx) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(queue = %self.shared.name, "Queue closed");
                Ok(())
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::error!(queue = %self.shared.name, "Queue closed more than once");
                Err(Error::DoubleClose {
                    queue: self.shared.name.clone(),
                })
            }
        }
    }

    fn put_after_close(&self) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(queue = %self.shared.name, "Put into closed queue");
        Error::PutAfterClose {
            queue: self.shared.name.clone(),
        }
    }
}

impl<T> MessageQueue<T> {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        if self.shared.drained.load(Ordering::Acquire) {
            QueueState::Closed
        } else if self.shared.tx.lock().is_some() {
            QueueState::Open
        } else {
            QueueState::Closing
        }
    }

    /// Number of times `close` has been called, including rejected calls.
    pub fn close_calls(&self) -> usize {
        self.shared.close_calls.load(Ordering::Acquire)
    }

    /// Number of items that were successfully enqueued.
    pub fn delivered(&self) -> usize {
        self.shared.delivered.load(Ordering::Relaxed)
    }
}
