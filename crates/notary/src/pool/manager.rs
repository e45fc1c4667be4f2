//! Asynchronous worker pool for document signing.
//!
//! This module defines the [`WorkerPool`] struct, which starts a fixed number
//! of signing workers over a shared fan-out queue and a shared fan-in queue.
//! Workers pull from the fan-out queue as they become idle, so no dispatcher
//! is involved and no worker ever waits on a busy sibling.
//!
//! The fan-in queue is closed by a [`CompletionBarrier`] rather than by any
//! particular worker. Workers finish in no fixed order; the barrier closes the
//! queue from whichever worker happens to stop last, and only then.

use super::worker::worker_loop;
use crate::{CompletionBarrier, Document, Error, MessageQueue, Result, SignatureScheme};
use std::sync::Arc;
use tokio_util::task::AbortOnDropHandle;

/// A running set of signing workers sharing one input and one output queue.
///
/// Dropping the pool before [`WorkerPool::join`] completes aborts the
/// workers. Aborted workers still count themselves out of the barrier, so the
/// merged queue is closed either way.
pub struct WorkerPool {
    barrier: CompletionBarrier,
    workers: Vec<AbortOnDropHandle<Result<usize>>>,
}

impl WorkerPool {
    /// Spawns `num_workers` workers that sign documents from `distribute` and
    /// push them into `merged`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `num_workers` is zero.
    pub fn spawn<S: SignatureScheme>(
        num_workers: usize,
        key: Arc<S::SigningKey>,
        distribute: MessageQueue<Document>,
        merged: MessageQueue<Document>,
    ) -> Result<Self> {
        let closer = merged.clone();
        let (barrier, arrivals) = CompletionBarrier::new(num_workers, move || closer.close())
            .map_err(|_| Error::InvalidConfig {
                reason: "worker pool size must be greater than 0".to_string(),
            })?;

        let workers = arrivals
            .into_iter()
            .enumerate()
            .map(|(worker_id, arrival)| {
                let fut = worker_loop::<S>(
                    worker_id,
                    Arc::clone(&key),
                    distribute.clone(),
                    merged.clone(),
                    arrival,
                );
                #[cfg(feature = "tracing")]
                let fut = {
                    use tracing::Instrument;
                    fut.instrument(tracing::debug_span!("worker", worker_id))
                };
                AbortOnDropHandle::new(tokio::spawn(fut))
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!("Spawned {num_workers} signing workers");

        Ok(Self { barrier, workers })
    }

    /// The barrier that closes the merged queue once every worker has
    /// stopped.
    pub fn barrier(&self) -> &CompletionBarrier {
        &self.barrier
    }

    /// Waits for every worker and returns their processed counts, indexed by
    /// worker id.
    ///
    /// # Errors
    ///
    /// Returns the lowest-indexed worker's error if any worker failed, or
    /// [`Error::TaskFailed`] if a worker panicked.
    pub async fn join(self) -> Result<Vec<usize>> {
        let results = futures::future::join_all(self.workers).await;

        results
            .into_iter()
            .enumerate()
            .map(|(worker_id, res)| match res {
                Ok(processed) => processed,
                Err(e) => Err(Error::TaskFailed {
                    context: format!("worker {worker_id}: {e}"),
                }),
            })
            .collect()
    }
}
