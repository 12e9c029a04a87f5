//! Benchmarks for hub fan-out
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use fanhub::hub::{Hub, HubConfig};
use fanhub::NoopSink;
use std::sync::Arc;

const MESSAGES_PER_ITER: usize = 100;

fn bench_fanout(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("fanout");

    for clients in [1, 10, 100] {
        let hub = runtime.block_on(async {
            let config = HubConfig {
                outbound_capacity: 4096,
                ..HubConfig::default()
            };
            let (hub, _task) = Hub::spawn(config, Arc::new(NoopSink));

            for _ in 0..clients {
                let (connection, mut outbound) = hub.new_connection();
                hub.register(&connection).await.unwrap();
                // Drain so queues never fill and nobody gets dropped
                tokio::spawn(async move { while outbound.recv().await.is_some() {} });
            }

            hub
        });

        group.throughput(Throughput::Elements((MESSAGES_PER_ITER * clients) as u64));

        group.bench_function(format!("deliver_{}_clients", clients), |b| {
            b.iter(|| {
                runtime.block_on(async {
                    for _ in 0..MESSAGES_PER_ITER {
                        hub.deliver(black_box("benchmark payload")).await.unwrap();
                    }
                    // Stats is answered only after every queued delivery
                    hub.stats().await.unwrap()
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fanout);
criterion_main!(benches);
