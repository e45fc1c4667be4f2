//! Console logging for the `notary` binary.
//!
//! Events are printed through `tracing_subscriber::fmt`. Verbosity follows
//! `RUST_LOG` and defaults to `info`, which shows per-stage totals; `debug`
//! adds stage lifecycle and rejected documents, `trace` adds queue closes.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .try_init()?;

    Ok(())
}
