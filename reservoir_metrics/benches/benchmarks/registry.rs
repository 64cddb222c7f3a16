use std::{
    cmp::{max, min},
    time::Instant,
};

use criterion::{black_box, Criterion};
use reservoir_metrics::{
    get_or_register_counter, Labels, MeterTicker, PrefixedRegistry, Registry, StandardRegistry,
};

const NAMES: [&str; 8] = [
    "requests", "errors", "retries", "timeouts", "hits", "misses", "bytes", "connections",
];

pub fn registry(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("registry");
    group.throughput(criterion::Throughput::Elements(1));

    let registry = StandardRegistry::with_meter_ticker(MeterTicker::default());
    for threads in [1, 4, 16] {
        group.bench_function(
            format!("get-or-register-concurrency-{threads:02}"),
            |bencher| {
                bencher.iter_custom(|iterations| {
                    let thread_count = max(1, min(threads, iterations));
                    let iterations_per_thread = iterations / thread_count;

                    let start = Instant::now();
                    std::thread::scope(|scope| {
                        for _ in 0..thread_count {
                            scope.spawn(|| {
                                for i in 0..iterations_per_thread {
                                    let name = NAMES[i as usize % NAMES.len()];
                                    if let Ok(counter) =
                                        get_or_register_counter(name, Some(&registry), Labels::default())
                                    {
                                        counter.inc(1);
                                    }
                                }
                            });
                        }
                    });
                    start.elapsed()
                });
            },
        );
    }

    let prefixed = PrefixedRegistry::new("service.");
    for name in NAMES {
        let _ = get_or_register_counter(name, Some(&prefixed), Labels::default());
    }
    group.bench_function("prefixed-each", |bencher| {
        bencher.iter(|| {
            let mut visited = 0;
            prefixed.each(&mut |name, metric| {
                black_box((name, metric.snapshot()));
                visited += 1;
            });
            black_box(visited)
        })
    });
}

criterion::criterion_group!(benches, registry);
