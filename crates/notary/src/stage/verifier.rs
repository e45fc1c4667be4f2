use crate::{Document, MessageQueue, Result, SignatureScheme};
use std::sync::Arc;

/// Tally of a verifier run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Verification {
    /// Documents received, valid or not.
    pub examined: usize,
    /// Documents forwarded downstream.
    pub accepted: usize,
    /// Documents dropped because they were unsigned or the signature did not
    /// verify.
    pub rejected: usize,
}

/// Checks each document's signature and forwards only the valid ones.
///
/// Invalid documents are dropped and counted; they never halt the stage. On
/// end-of-stream from `input`, `out` is closed exactly once.
///
/// # Errors
///
/// Returns a protocol violation if `out` was closed by another party.
pub async fn verify_documents<S: SignatureScheme>(
    key: Arc<S::VerifyingKey>,
    input: MessageQueue<Document>,
    out: MessageQueue<Document>,
) -> Result<Verification> {
    #[cfg(feature = "tracing")]
    tracing::trace!("Verifier started");

    let mut tally = Verification::default();
    while let Some(doc) = input.get().await {
        tally.examined += 1;

        let valid = doc
            .signature()
            .is_some_and(|signature| S::verify(&*key, doc.text().as_bytes(), signature));
        if !valid {
            tally.rejected += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(signed = doc.is_signed(), "Rejected document");
            continue;
        }

        out.put(doc).await?;
        tally.accepted += 1;
    }
    out.close()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        examined = tally.examined,
        rejected = tally.rejected,
        "Verifier finished"
    );
    Ok(tally)
}
