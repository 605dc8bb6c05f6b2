//! Route resolution benchmarks.
//!
//! Run with: `cargo bench -p rested-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rested_router::RouteTable;

fn build_table(num_resources: usize) -> RouteTable<usize> {
    let mut table = RouteTable::new();

    for i in 0..num_resources {
        let pk = format!("res{i}_pk");
        table
            .insert(&format!("/api/res{i}"), i)
            .and_then(|()| table.insert(&format!("/api/res{i}/{{{pk}}}"), i))
            .and_then(|()| table.insert(&format!("/api/res{i}/{{{pk}}}/*action"), i))
            .expect("benchmark routes are unique");
    }

    table
}

fn bench_collection(c: &mut Criterion) {
    let table = build_table(50);

    c.bench_function("collection_resolve", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/res25"));
        });
    });
}

fn bench_item(c: &mut Criterion) {
    let table = build_table(50);

    c.bench_function("item_resolve", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/res25/12345"));
        });
    });
}

fn bench_action(c: &mut Criterion) {
    let table = build_table(50);

    c.bench_function("action_resolve", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/res25/12345/reports/daily"));
        });
    });
}

fn bench_table_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");

    for size in [5, 50, 500] {
        let table = build_table(size);
        let path = format!("/api/res{}/42", size / 2);

        group.bench_with_input(BenchmarkId::from_parameter(size), &path, |b, path| {
            b.iter(|| black_box(table.resolve(path)));
        });
    }

    group.finish();
}

fn bench_miss(c: &mut Criterion) {
    let table = build_table(50);

    c.bench_function("miss", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/unknown/1"));
        });
    });
}

criterion_group!(
    benches,
    bench_collection,
    bench_item,
    bench_action,
    bench_table_sizes,
    bench_miss
);
criterion_main!(benches);
