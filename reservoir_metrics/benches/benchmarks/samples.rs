use criterion::{black_box, Criterion};
use reservoir_metrics::{
    ExpDecaySample, Sample, UniformSample, DEFAULT_DECAY_ALPHA, DEFAULT_RESERVOIR_SIZE,
};

pub fn samples(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("samples");
    group.throughput(criterion::Throughput::Elements(1));

    let uniform = UniformSample::new(DEFAULT_RESERVOIR_SIZE);
    let mut i = 0;
    group.bench_function("uniform-update", |bencher| {
        bencher.iter(|| {
            i += 1;
            uniform.update(black_box(i))
        })
    });

    // Once the reservoir is full every update competes with the lowest priority.
    let exp_decay = ExpDecaySample::new(DEFAULT_RESERVOIR_SIZE, DEFAULT_DECAY_ALPHA);
    let mut i = 0;
    group.bench_function("exp-decay-update", |bencher| {
        bencher.iter(|| {
            i += 1;
            exp_decay.update(black_box(i))
        })
    });

    group.bench_function("exp-decay-percentiles", |bencher| {
        bencher.iter(|| black_box(exp_decay.percentiles(&[0.5, 0.75, 0.99, 0.999])))
    });
}

criterion::criterion_group!(benches, samples);
