use criterion::criterion_main;

mod benchmarks;

criterion_main! {
    benchmarks::instruments::benches,
    benchmarks::samples::benches,
    benchmarks::registry::benches,
}
