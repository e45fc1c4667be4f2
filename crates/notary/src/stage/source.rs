use crate::{Document, MessageQueue, Result, TextGenerator};
use core::time::Duration;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Produces unsigned documents at irregular intervals until cancelled.
///
/// The source is the only stage that observes the cancellation signal. Every
/// other stage learns about the shutdown from the end-of-stream this source
/// puts on its output queue.
pub struct DocumentSource<G> {
    generator: G,
    max_delay: Duration,
    rng: StdRng,
}

impl<G: TextGenerator> DocumentSource<G> {
    /// Creates a source that pauses for a random delay in `[0, max_delay)`
    /// after each document.
    pub fn new(generator: G, max_delay: Duration) -> Self {
        Self {
            generator,
            max_delay,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Makes the delay sequence reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn next_delay(&mut self) -> Duration {
        if self.max_delay.is_zero() {
            Duration::ZERO
        } else {
            self.rng.random_range(Duration::ZERO..self.max_delay)
        }
    }

    /// Runs the source until `cancel` fires.
    ///
    /// Each iteration races the cancellation signal against enqueueing a new
    /// document; cancellation is checked first, so once it has been observed
    /// no further document is enqueued. The pause between documents is raced
    /// against cancellation as well, which bounds the shutdown latency by a
    /// single delay.
    ///
    /// On exit the output queue is closed exactly once. Returns the number of
    /// documents produced.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation if `out` was closed by another party.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        out: MessageQueue<Document>,
    ) -> Result<usize> {
        #[cfg(feature = "tracing")]
        tracing::trace!("Document source started");

        let mut produced = 0;
        loop {
            let doc = Document::new(self.generator.next_sentence());
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                res = out.put(doc) => res?,
            }
            produced += 1;

            let delay = self.next_delay();
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = sleep(delay) => {}
            }
        }
        out.close()?;

        #[cfg(feature = "tracing")]
        tracing::info!(produced, "Document source stopped");
        Ok(produced)
    }
}
