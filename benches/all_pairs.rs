use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use dev_utils::{build_example_catalogue, example_query_pair};
use transit_router::transit::TransitRouter;

fn build_benchmark(c: &mut Criterion) {
    let catalogue = build_example_catalogue();
    c.bench_function("TransitRouter::build", |b| b.iter(|| TransitRouter::build(black_box(&catalogue))));
}

fn query_benchmark(c: &mut Criterion) {
    let catalogue = build_example_catalogue();
    let router = TransitRouter::build(&catalogue);
    let (from, to) = example_query_pair();
    let from_id = router.stop_id(from).unwrap();
    let to_id = router.stop_id(to).unwrap();
    c.bench_function("TransitRouter::build_route", |b| b.iter(|| router.build_route(black_box(from_id), black_box(to_id))));
}

criterion_group!(benches, build_benchmark, query_benchmark);
criterion_main!(benches);
