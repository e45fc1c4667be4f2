use core::time::Duration;
use tokio::{task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;

/// Cancels `token` once `after` has elapsed.
///
/// The timer gives up quietly if the token is cancelled by someone else
/// first, so it can be combined with any other trigger (signal handler,
/// manual call). Must be called from within a Tokio runtime.
pub fn cancel_after(token: CancellationToken, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            () = sleep(after) => {
                #[cfg(feature = "tracing")]
                tracing::info!("Run time of {after:?} elapsed, cancelling");
                token.cancel();
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn fires_after_the_duration() {
        let token = CancellationToken::new();
        let start = Instant::now();
        cancel_after(token.clone(), Duration::from_secs(3));

        token.cancelled().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn yields_to_an_earlier_trigger() {
        let token = CancellationToken::new();
        let timer = cancel_after(token.clone(), Duration::from_secs(60));

        token.cancel();
        timer.await.unwrap();
        // Cancelling again is a no-op.
        token.cancel();
        assert!(token.is_cancelled());
    }
}
