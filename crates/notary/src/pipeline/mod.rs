//! Pipeline composition and shutdown.
//!
//! [`run_pipeline`] wires the stages together and runs each one as its own
//! Tokio task:
//!
//! ```text
//! source --produced--> relay --distribute--> pool --merged--> verifier --verified--> sink
//! ```
//!
//! The cancellation token is handed to the source only. Every other stage
//! stops because its input queue reached end-of-stream, so the shutdown is
//! driven purely by data: the source closes `produced`, the relay closes
//! `distribute`, the pool's barrier closes `merged`, and the verifier closes
//! `verified`.
//!
//! A stage that returns an error has violated the queue protocol. That is
//! fatal for the whole run: the remaining stages are aborted and the error is
//! returned.

#[cfg(test)]
mod tests;

use crate::{
    Document, Error, MessageQueue, Result, SignatureScheme, TextGenerator, WorkerPool,
    stage::{DocumentSource, Verification, discard, relay, verify_documents},
};
use core::time::Duration;
use std::sync::Arc;
use tokio::{task::JoinSet, time::Instant};
use tokio_util::sync::CancellationToken;

/// Tunables for a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of signing workers. Must be greater than 0.
    pub num_workers: usize,
    /// Upper bound (exclusive) of the source's random pause between
    /// documents.
    pub max_delay: Duration,
    /// Capacity of every inter-stage queue; `None` makes them unbounded.
    pub queue_capacity: Option<usize>,
    /// Seed for the source's delay sequence.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: 2,
            max_delay: Duration::from_millis(100),
            queue_capacity: Some(1),
            seed: None,
        }
    }
}

/// Per-stage totals of a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Documents created by the source.
    pub produced: usize,
    /// Documents forwarded by the relay into the pool.
    pub relayed: usize,
    /// Documents signed by each worker, indexed by worker id.
    pub signed: Vec<usize>,
    /// Verifier tally.
    pub verification: Verification,
    /// Documents that reached the sink.
    pub sunk: usize,
    /// Wall time from start to the last stage finishing.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Documents signed by the pool as a whole.
    pub fn signed_total(&self) -> usize {
        self.signed.iter().sum()
    }
}

enum StageOutcome {
    Produced(usize),
    Relayed(usize),
    Signed(Vec<usize>),
    Verified(Verification),
    Sunk(usize),
}

/// Runs the pipeline until `cancel` fires and every stage has drained.
///
/// Keys are generated once with `S` and shared read-only: the signing key by
/// the pool, the verifying key by the verifier.
///
/// # Errors
///
/// - [`Error::InvalidConfig`] if `config.num_workers` is zero.
/// - Any protocol violation raised by a stage.
/// - [`Error::TaskFailed`] if a stage panicked.
pub async fn run_pipeline<S, G>(
    config: &PipelineConfig,
    generator: G,
    cancel: CancellationToken,
) -> Result<PipelineReport>
where
    S: SignatureScheme,
    G: TextGenerator,
{
    if config.num_workers == 0 {
        return Err(Error::InvalidConfig {
            reason: "num_workers must be greater than 0".to_string(),
        });
    }

    let start = Instant::now();
    let (signing, verifying) = S::generate_keypair();

    let queue =
        |name: &str| MessageQueue::<Document>::with_capacity(name, config.queue_capacity);
    let produced = queue("produced");
    let distribute = queue("distribute");
    let merged = queue("merged");
    let verified = queue("verified");

    let mut source = DocumentSource::new(generator, config.max_delay);
    if let Some(seed) = config.seed {
        source = source.with_seed(seed);
    }
    let pool = WorkerPool::spawn::<S>(
        config.num_workers,
        Arc::new(signing),
        distribute.clone(),
        merged.clone(),
    )?;

    let mut stages = JoinSet::new();
    spawn_stage(&mut stages, "source", {
        let produced = produced.clone();
        async move {
            source
                .run(cancel, produced)
                .await
                .map(StageOutcome::Produced)
        }
    });
    spawn_stage(&mut stages, "relay", async move {
        relay(produced, distribute).await.map(StageOutcome::Relayed)
    });
    spawn_stage(&mut stages, "pool", async move {
        pool.join().await.map(StageOutcome::Signed)
    });
    spawn_stage(&mut stages, "verifier", {
        let verified = verified.clone();
        async move {
            verify_documents::<S>(Arc::new(verifying), merged, verified)
                .await
                .map(StageOutcome::Verified)
        }
    });
    spawn_stage(&mut stages, "sink", async move {
        Ok(StageOutcome::Sunk(discard(verified).await))
    });

    let mut report = PipelineReport::default();
    while let Some(joined) = stages.join_next().await {
        let outcome = match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Stage failed, aborting pipeline: {e}");
                stages.abort_all();
                return Err(e);
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Stage task died, aborting pipeline: {e}");
                stages.abort_all();
                return Err(Error::TaskFailed {
                    context: e.to_string(),
                });
            }
        };

        match outcome {
            StageOutcome::Produced(n) => report.produced = n,
            StageOutcome::Relayed(n) => report.relayed = n,
            StageOutcome::Signed(counts) => report.signed = counts,
            StageOutcome::Verified(tally) => report.verification = tally,
            StageOutcome::Sunk(n) => report.sunk = n,
        }
    }
    report.elapsed = start.elapsed();

    #[cfg(feature = "tracing")]
    tracing::debug!(elapsed = ?report.elapsed, "Pipeline drained");
    Ok(report)
}

fn spawn_stage<F>(stages: &mut JoinSet<Result<StageOutcome>>, _name: &'static str, fut: F)
where
    F: Future<Output = Result<StageOutcome>> + Send + 'static,
{
    #[cfg(feature = "tracing")]
    let fut = {
        use tracing::Instrument;
        fut.instrument(tracing::info_span!("stage", name = _name))
    };
    stages.spawn(fut);
}
