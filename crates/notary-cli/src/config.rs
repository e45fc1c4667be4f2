use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use notary::PipelineConfig;

/// Runtime configuration for the `notary` binary.
///
/// These settings control how long the source runs, how fast it produces
/// documents and how wide the signing pool is. All values are parsed from CLI
/// arguments or environment variables, with defaults that reproduce the
/// reference run: two workers, three seconds, up to 100 ms between documents.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "notary",
    version,
    about = "Generates, signs and verifies documents through a cancellable worker pipeline"
)]
pub struct CliArgs {
    /// Number of worker tasks signing documents concurrently.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 2)]
    pub num_workers: usize,

    /// How long the source produces documents before it is cancelled, in
    /// milliseconds. The pipeline then drains whatever is in flight.
    ///
    /// Environment variable: `RUN_FOR_MS`
    #[arg(long, env = "RUN_FOR_MS", default_value_t = 3_000)]
    pub run_for_ms: u64,

    /// Upper bound (exclusive) of the random pause after each document, in
    /// milliseconds. Zero disables the pause.
    ///
    /// Environment variable: `MAX_DELAY_MS`
    #[arg(long, env = "MAX_DELAY_MS", default_value_t = 100)]
    pub max_delay_ms: u64,

    /// Capacity of every queue between stages. Lower values tighten
    /// backpressure; zero makes the queues unbounded.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 1)]
    pub queue_capacity: usize,

    /// Number of words in each generated document.
    ///
    /// Environment variable: `WORDS_PER_SENTENCE`
    #[arg(long, env = "WORDS_PER_SENTENCE", default_value_t = 9)]
    pub words_per_sentence: usize,

    /// Seed for the generated text and the pauses. Random when omitted.
    ///
    /// Environment variable: `SEED`
    #[arg(long, env = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub pipeline: PipelineConfig,
    pub run_for: Duration,
    pub words_per_sentence: usize,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.words_per_sentence == 0 {
            bail!("WORDS_PER_SENTENCE must be greater than 0");
        }

        let queue_capacity = match args.queue_capacity {
            0 => None,
            capacity => Some(capacity),
        };

        Ok(Self {
            pipeline: PipelineConfig {
                num_workers: args.num_workers,
                max_delay: Duration::from_millis(args.max_delay_ms),
                queue_capacity,
                seed: args.seed,
            },
            run_for: Duration::from_millis(args.run_for_ms),
            words_per_sentence: args.words_per_sentence,
        })
    }
}
