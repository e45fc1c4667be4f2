use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use notary::{
    Document, Ed25519, LoremGenerator, MessageQueue, SignatureScheme, TextGenerator, WorkerPool,
};
use std::{sync::Arc, time::Instant};
use tokio::runtime::Builder;

const TOTAL_DOCS: usize = 4096;

/// Pushes `TOTAL_DOCS` documents through a pool of `num_workers` signers and
/// drains the merged queue.
fn bench_worker_pool(c: &mut Criterion, group_name: &str, capacity: Option<usize>) {
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);
    group.sampling_mode(criterion::SamplingMode::Flat);

    let mut text = LoremGenerator::seeded(0, 9);
    let corpus: Arc<Vec<String>> =
        Arc::new((0..TOTAL_DOCS).map(|_| text.next_sentence()).collect());

    for num_workers in [1, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements(TOTAL_DOCS as u64));
        group.bench_function(format!("docs/{TOTAL_DOCS}/workers/{num_workers}"), |b| {
            let rt = Builder::new_multi_thread().enable_all().build().unwrap();
            let (signing, _) = Ed25519::generate_keypair();
            let signing = Arc::new(signing);

            b.to_async(&rt).iter_custom(|iters| {
                let corpus = Arc::clone(&corpus);
                let signing = Arc::clone(&signing);
                async move {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let distribute = MessageQueue::with_capacity("distribute", capacity);
                        let merged = MessageQueue::with_capacity("merged", capacity);
                        let pool = WorkerPool::spawn::<Ed25519>(
                            num_workers,
                            Arc::clone(&signing),
                            distribute.clone(),
                            merged.clone(),
                        )
                        .unwrap();

                        let feeder = {
                            let corpus = Arc::clone(&corpus);
                            tokio::spawn(async move {
                                for sentence in corpus.iter() {
                                    let doc = Document::new(sentence.as_str());
                                    distribute.put(doc).await.unwrap();
                                }
                                distribute.close().unwrap();
                            })
                        };

                        while let Some(doc) = merged.get().await {
                            black_box(doc);
                        }
                        feeder.await.unwrap();
                        black_box(pool.join().await.unwrap());
                    }

                    start.elapsed()
                }
            });
        });
    }

    group.finish();
}

fn benchmark_pool_bounded(c: &mut Criterion) {
    bench_worker_pool(c, "pool/bounded_1", Some(1));
}

fn benchmark_pool_buffered(c: &mut Criterion) {
    bench_worker_pool(c, "pool/bounded_64", Some(64));
}

fn benchmark_pool_unbounded(c: &mut Criterion) {
    bench_worker_pool(c, "pool/unbounded", None);
}

criterion_group!(
    benches,
    benchmark_pool_bounded,
    benchmark_pool_buffered,
    benchmark_pool_unbounded
);
criterion_main!(benches);
