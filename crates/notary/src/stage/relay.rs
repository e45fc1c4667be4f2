use crate::{Document, MessageQueue, Result};

/// Forwards every document from `input` into `distribute`.
///
/// The relay is the single place where the source's end-of-stream turns into
/// the pool's end-of-stream: `distribute` is closed exactly once, and only
/// after every document already enqueued in `input` has been forwarded.
///
/// Returns the number of relayed documents.
///
/// # Errors
///
/// Returns a protocol violation if `distribute` was closed by someone else.
pub async fn relay(
    input: MessageQueue<Document>,
    distribute: MessageQueue<Document>,
) -> Result<usize> {
    #[cfg(feature = "tracing")]
    tracing::trace!("Relay started");

    let mut relayed = 0;
    while let Some(doc) = input.get().await {
        distribute.put(doc).await?;
        relayed += 1;
    }
    distribute.close()?;

    #[cfg(feature = "tracing")]
    tracing::debug!(relayed, "Relay finished");
    Ok(relayed)
}
