use std::{
    cmp::{max, min},
    sync::Arc,
    time::{Duration, Instant},
};

use criterion::{black_box, Criterion};
use reservoir_metrics::{Counter, Histogram, Instrument, Labels, Meter, Timer};

pub fn instruments(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("instruments");
    group.throughput(criterion::Throughput::Elements(1));

    let counter = Arc::new(Counter::default());
    for threads in [1, 4, 16] {
        group.bench_function(format!("counter-concurrency-{threads:02}"), |bencher| {
            bencher.iter_custom(|iterations| {
                let thread_count = max(1, min(threads, iterations));
                let iterations_per_thread = iterations / thread_count;

                let start = Instant::now();
                std::thread::scope(|scope| {
                    for _ in 0..thread_count {
                        scope.spawn(|| {
                            for _ in 0..iterations_per_thread {
                                counter.inc(1);
                            }
                        });
                    }
                });
                start.elapsed()
            });
        });
    }

    let meter = Meter::default();
    group.bench_function("meter-mark", |bencher| bencher.iter(|| meter.mark(1)));

    let timer = Timer::default();
    group.bench_function("timer-update", |bencher| {
        bencher.iter(|| timer.update(Duration::from_micros(black_box(250))))
    });

    let histogram = Histogram::default();
    for value in 0..10_000 {
        histogram.update(value);
    }
    group.bench_function("histogram-snapshot", |bencher| {
        bencher.iter(|| black_box(histogram.snapshot()))
    });

    let labels = Labels::new([("service", "checkout"), ("region", "us-west-2")]);
    let counter = Counter::new(labels.clone());
    group.bench_function("counter-with-labels", |bencher| {
        bencher.iter(|| black_box(counter.with_labels(&labels)))
    });
}

criterion::criterion_group!(benches, instruments);
