#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, CliConfig};
use notary::{Ed25519, LoremGenerator, PipelineReport, cancel_after, run_pipeline};
use telemetry::init_telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let cancel = CancellationToken::new();
    cancel_after(cancel.clone(), config.run_for);
    tokio::spawn(shutdown_signal(cancel.clone()));

    let generator = match config.pipeline.seed {
        Some(seed) => LoremGenerator::seeded(seed, config.words_per_sentence),
        None => LoremGenerator::new(config.words_per_sentence),
    };

    let report = run_pipeline::<Ed25519, _>(&config.pipeline, generator, cancel).await?;
    print_summary(&report);

    tracing::info!("Pipeline shut down successfully");
    Ok(())
}

fn log_startup_info(config: &CliConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting pipeline with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting pipeline with {} workers for {:?}",
            config.pipeline.num_workers,
            config.run_for
        );
    }
}

fn print_summary(report: &PipelineReport) {
    println!("{} documents were created by the source", report.produced);
    println!("{} documents were relayed to the workers", report.relayed);
    for (worker_id, signed) in report.signed.iter().enumerate() {
        println!("{signed} documents were signed by worker {worker_id}");
    }
    println!(
        "{} documents were verified ({} rejected)",
        report.verification.examined, report.verification.rejected
    );
    println!("{} documents were sent to the sink", report.sunk);
    println!("Drained in {:.2?}", report.elapsed);
}

/// Cancels the run early on Ctrl+C or SIGTERM.
///
/// Only the source observes the token; the rest of the pipeline drains on its
/// own once the source has closed its queue.
async fn shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = cancel.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, draining pipeline...");
    cancel.cancel();
}
