use crate::{Arrival, Document, MessageQueue, Result, SignatureScheme};
use std::sync::Arc;

/// Worker task that signs documents from the shared `distribute` queue.
///
/// Workers compete for documents: whichever worker is idle takes the next
/// one, so documents may leave the pool in a different order than they
/// entered it. Each document is signed and pushed into the shared `merged`
/// queue.
///
/// On end-of-stream from `distribute`, the worker arrives at the pool's
/// completion barrier and returns how many documents it signed. The worker
/// never closes `merged` itself; the barrier does that once the last worker
/// has arrived.
///
/// # Arguments
///
/// - `_worker_id`: Index of this worker, used for logs.
/// - `key`: Signing key shared read-only by the whole pool.
/// - `distribute`: Fan-out queue fed by the relay.
/// - `merged`: Fan-in queue read by the verifier.
/// - `arrival`: This worker's slot in the completion barrier. If the task is
///   aborted or panics, dropping it still counts the worker out.
///
/// # Errors
///
/// Returns a protocol violation if `merged` was closed while this worker
/// still had a document to deliver, or if the barrier's close of `merged`
/// failed.
#[allow(clippy::used_underscore_binding)]
pub async fn worker_loop<S: SignatureScheme>(
    _worker_id: usize,
    key: Arc<S::SigningKey>,
    distribute: MessageQueue<Document>,
    merged: MessageQueue<Document>,
    arrival: Arrival,
) -> Result<usize> {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    let mut processed = 0;
    let outcome = async {
        while let Some(doc) = distribute.get().await {
            let signature = S::sign(&*key, doc.text().as_bytes());
            merged.put(doc.with_signature(signature)).await?;
            processed += 1;
        }
        Ok::<(), crate::Error>(())
    }
    .await;

    // Arrive on failure too, so the rest of the pool can still
    // close `merged`.
    let closed_merged = arrival.arrive();

    #[cfg(feature = "tracing")]
    {
        match (&outcome, &closed_merged) {
            (Ok(()), Ok(true)) => tracing::debug!(
                "Worker {_worker_id} was the last to stop, closed `{}`",
                merged.name()
            ),
            (Ok(()), Ok(false)) => tracing::trace!("Worker {_worker_id} stopped"),
            (Err(e), _) | (_, Err(e)) => tracing::error!("Worker {_worker_id} failed: {e}"),
        }
        tracing::info!("{processed} documents were signed by worker {_worker_id}");
    }

    outcome?;
    closed_merged?;
    Ok(processed)
}
