use crate::{Document, MessageQueue};

/// Consumes `input` until end-of-stream, dropping every document.
///
/// Returns how many documents were consumed.
pub async fn discard(input: MessageQueue<Document>) -> usize {
    let mut consumed = 0;
    while let Some(_doc) = input.get().await {
        consumed += 1;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(consumed, "Sink drained");
    consumed
}
