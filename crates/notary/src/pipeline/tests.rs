use super::{PipelineConfig, PipelineReport, run_pipeline};
use crate::{Ed25519, Error, LoremGenerator, SignatureScheme, cancel_after};
use bytes::Bytes;
use core::time::Duration;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;

/// Ed25519, except that messages whose length is a multiple of three get a
/// signature of zeros.
struct Sloppy;

impl SignatureScheme for Sloppy {
    type SigningKey = <Ed25519 as SignatureScheme>::SigningKey;
    type VerifyingKey = <Ed25519 as SignatureScheme>::VerifyingKey;

    fn generate_keypair() -> (Self::SigningKey, Self::VerifyingKey) {
        Ed25519::generate_keypair()
    }

    fn sign(key: &Self::SigningKey, message: &[u8]) -> Bytes {
        if message.len() % 3 == 0 {
            Bytes::from_static(&[0; 64])
        } else {
            Ed25519::sign(key, message)
        }
    }

    fn verify(key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        Ed25519::verify(key, message, signature)
    }
}

/// Ed25519, except that signing the fourth numbered document panics.
struct Brittle;

impl SignatureScheme for Brittle {
    type SigningKey = <Ed25519 as SignatureScheme>::SigningKey;
    type VerifyingKey = <Ed25519 as SignatureScheme>::VerifyingKey;

    fn generate_keypair() -> (Self::SigningKey, Self::VerifyingKey) {
        Ed25519::generate_keypair()
    }

    fn sign(key: &Self::SigningKey, message: &[u8]) -> Bytes {
        assert_ne!(message, b"doc 3", "signer gave up");
        Ed25519::sign(key, message)
    }

    fn verify(key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        Ed25519::verify(key, message, signature)
    }
}

fn numbered() -> impl FnMut() -> String + Send + 'static {
    let mut next = 0_usize;
    move || {
        next += 1;
        format!("doc {}", next - 1)
    }
}

fn assert_conserved(report: &PipelineReport) {
    assert_eq!(report.relayed, report.produced);
    assert_eq!(report.signed_total(), report.relayed);
    assert_eq!(report.verification.examined, report.signed_total());
    assert_eq!(
        report.verification.accepted + report.verification.rejected,
        report.verification.examined
    );
    assert_eq!(report.sunk, report.verification.accepted);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn two_workers_for_three_seconds() {
    let config = PipelineConfig {
        num_workers: 2,
        max_delay: Duration::from_millis(100),
        queue_capacity: Some(1),
        seed: Some(11),
    };
    let cancel = CancellationToken::new();
    cancel_after(cancel.clone(), Duration::from_secs(3));

    let start = Instant::now();
    let report = timeout(
        Duration::from_secs(4),
        run_pipeline::<Ed25519, _>(&config, LoremGenerator::seeded(11, 9), cancel),
    )
    .await
    .expect("pipeline drains within 4s")
    .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(report.produced > 0);
    assert_eq!(report.signed.len(), 2);
    assert_eq!(report.verification.rejected, 0);
    assert_eq!(report.verification.accepted, report.produced);
    assert_conserved(&report);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn totals_hold_for_any_pool_size() {
    for num_workers in [1, 2, 8] {
        let config = PipelineConfig {
            num_workers,
            max_delay: Duration::from_millis(1),
            queue_capacity: Some(4),
            seed: None,
        };
        let cancel = CancellationToken::new();
        cancel_after(cancel.clone(), Duration::from_millis(200));

        let report = run_pipeline::<Ed25519, _>(&config, LoremGenerator::new(9), cancel)
            .await
            .unwrap();

        assert_eq!(report.signed.len(), num_workers);
        assert_eq!(report.verification.rejected, 0);
        assert_conserved(&report);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_signatures_are_dropped_and_counted() {
    let config = PipelineConfig {
        num_workers: 3,
        max_delay: Duration::ZERO,
        queue_capacity: None,
        seed: None,
    };
    let cancel = CancellationToken::new();
    cancel_after(cancel.clone(), Duration::from_millis(100));

    let report = run_pipeline::<Sloppy, _>(&config, numbered(), cancel)
        .await
        .unwrap();

    let expected_rejected = (0..report.produced)
        .filter(|i| format!("doc {i}").len() % 3 == 0)
        .count();
    assert!(report.produced > 0);
    assert_eq!(report.verification.rejected, expected_rejected);
    assert_eq!(
        report.verification.accepted,
        report.produced - expected_rejected
    );
    assert_conserved(&report);
}

#[tokio::test]
async fn cancelled_before_start_drains_empty() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = timeout(
        Duration::from_secs(1),
        run_pipeline::<Ed25519, _>(&PipelineConfig::default(), numbered(), cancel),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(report.produced, 0);
    assert_eq!(report.signed, vec![0, 0]);
    assert_eq!(report.sunk, 0);
    assert_conserved(&report);
}

#[tokio::test]
async fn zero_workers_is_rejected() {
    let config = PipelineConfig {
        num_workers: 0,
        ..PipelineConfig::default()
    };
    let res = run_pipeline::<Ed25519, _>(&config, numbered(), CancellationToken::new()).await;
    assert!(matches!(res, Err(Error::InvalidConfig { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn panicking_worker_fails_the_run() {
    let config = PipelineConfig {
        num_workers: 2,
        max_delay: Duration::from_millis(1),
        queue_capacity: Some(1),
        seed: None,
    };
    let cancel = CancellationToken::new();
    cancel_after(cancel.clone(), Duration::from_millis(200));

    // The dead worker's arrival is released on unwind, so the rest of the
    // pipeline still drains and the run ends instead of hanging.
    let res = timeout(
        Duration::from_secs(2),
        run_pipeline::<Brittle, _>(&config, numbered(), cancel),
    )
    .await
    .expect("pipeline ends within 2s");

    match res {
        Err(Error::TaskFailed { context }) => assert!(context.contains("worker"), "{context}"),
        other => panic!("expected a failed worker task, got {other:?}"),
    }
}
