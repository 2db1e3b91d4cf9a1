use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dis_ingest_metrics::MetricsRecorder;
use dis_ingest_types::PduKind;
use std::sync::Arc;
use std::thread;

/// Benchmark the write path with a steady arrival clock
fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_kind", |b| {
        let recorder = MetricsRecorder::new();
        let mut ts = 0u64;
        b.iter(|| {
            ts += 1;
            recorder.record(black_box(PduKind::EntityState), black_box(ts));
        });
    });

    group.bench_function("rotating_kinds", |b| {
        let recorder = MetricsRecorder::new();
        let mut ts = 0u64;
        b.iter(|| {
            ts += 1;
            let kind = PduKind::ALL[(ts % PduKind::COUNT as u64) as usize];
            recorder.record(black_box(kind), black_box(ts));
        });
    });

    group.finish();
}

/// Benchmark snapshot cost against windows of varying fill
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for fill in [0u64, 1_000, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::new("entries", fill), fill, |b, &fill| {
            let recorder = MetricsRecorder::new();
            for i in 0..fill {
                let kind = PduKind::ALL[(i % PduKind::COUNT as u64) as usize];
                recorder.record(kind, 1_000 + i % 50_000);
            }
            b.iter(|| black_box(recorder.snapshot(black_box(55_000))));
        });
    }
    group.finish();
}

/// Benchmark one writer racing several snapshot readers
fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");

    for readers in [1, 2, 4].iter() {
        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(
            BenchmarkId::new("readers", readers),
            readers,
            |b, &readers| {
                b.iter(|| {
                    let recorder = Arc::new(MetricsRecorder::new());

                    let reader_handles: Vec<_> = (0..readers)
                        .map(|_| {
                            let recorder = Arc::clone(&recorder);
                            thread::spawn(move || {
                                for _ in 0..100 {
                                    black_box(recorder.snapshot(30_000));
                                }
                            })
                        })
                        .collect();

                    for i in 0..10_000u64 {
                        recorder.record(PduKind::Fire, 1_000 + i);
                    }

                    for handle in reader_handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_record, bench_snapshot, bench_contended);
criterion_main!(benches);
