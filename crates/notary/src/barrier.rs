//! Completion barrier for a group of tasks that share one output.
//!
//! The barrier counts down once per participant and runs a single observer
//! action when the count reaches zero. The count lives in one atomic and each
//! arrival is a single `fetch_sub`, so exactly one participant sees the
//! transition to zero and runs the observer, no matter in which order the
//! participants finish.

use crate::{Error, Result};
use parking_lot::Mutex;
use portable_atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type Observer = Box<dyn FnOnce() -> Result<()> + Send>;

struct Inner {
    remaining: AtomicUsize,
    observer: Mutex<Option<Observer>>,
    fired: CancellationToken,
}

/// A count-down latch that fires one observer when the last participant
/// arrives.
///
/// Participants are represented by [`Arrival`] tokens handed out by
/// [`CompletionBarrier::new`]. Each token arrives at most once: explicitly via
/// [`Arrival::arrive`], or implicitly when it is dropped.
#[derive(Clone)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

impl CompletionBarrier {
    /// Creates a barrier for `participants` arrivals and returns one
    /// [`Arrival`] per participant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `participants` is zero, since the
    /// observer could then never run.
    pub fn new<F>(participants: usize, observer: F) -> Result<(Self, Vec<Arrival>)>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        if participants == 0 {
            return Err(Error::InvalidConfig {
                reason: "a completion barrier needs at least one participant".to_string(),
            });
        }

        let barrier = Self {
            inner: Arc::new(Inner {
                remaining: AtomicUsize::new(participants),
                observer: Mutex::new(Some(Box::new(observer))),
                fired: CancellationToken::new(),
            }),
        };
        let arrivals = (0..participants)
            .map(|_| Arrival {
                barrier: Some(barrier.clone()),
            })
            .collect();

        Ok((barrier, arrivals))
    }

    /// Participants that have not arrived yet.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }

    /// Whether the observer has run.
    pub fn is_fired(&self) -> bool {
        self.inner.fired.is_cancelled()
    }

    /// Resolves once the observer has run.
    pub async fn wait(&self) {
        self.inner.fired.cancelled().await;
    }

    fn count_down(&self) -> Result<bool> {
        // AcqRel: the last arrival must see every write the others made before
        // arriving, and its own writes must precede the observer.
        if self.inner.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return Ok(false);
        }

        let observer = self.inner.observer.lock().take();
        let outcome = match observer {
            Some(observer) => observer(),
            None => Ok(()),
        };
        self.inner.fired.cancel();
        outcome.map(|()| true)
    }
}

/// One participant's handle on a [`CompletionBarrier`].
#[must_use = "an arrival that is dropped immediately counts down the barrier"]
pub struct Arrival {
    barrier: Option<CompletionBarrier>,
}

impl Arrival {
    /// Counts down the barrier.
    ///
    /// Returns `Ok(true)` if this arrival was the last one and ran the
    /// observer, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Propagates the observer's error to the participant that ran it.
    pub fn arrive(mut self) -> Result<bool> {
        match self.barrier.take() {
            Some(barrier) => barrier.count_down(),
            None => Ok(false),
        }
    }
}

impl Drop for Arrival {
    fn drop(&mut self) {
        let Some(barrier) = self.barrier.take() else {
            return;
        };

        #[cfg(feature = "tracing")]
        tracing::warn!("Participant left the barrier without arriving");

        if let Err(_e) = barrier.count_down() {
            #[cfg(feature = "tracing")]
            tracing::error!("Barrier observer failed: {_e}");
        }
    }
}
