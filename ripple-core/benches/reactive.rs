//! Benchmarks for ripple-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ripple_core::reactive::Runtime;
use ripple_core::{equal, Value};

fn bench_signal_get(c: &mut Criterion) {
    let runtime = Runtime::new();
    let s = runtime.signal(42i32);
    c.bench_function("signal_get", |b| b.iter(|| black_box(s.get())));
}

fn bench_signal_set(c: &mut Criterion) {
    let runtime = Runtime::new();
    let s = runtime.signal(0i32);
    let mut next = 0;
    c.bench_function("signal_set", |b| {
        b.iter(|| {
            next += 1;
            s.set(black_box(next))
        })
    });
}

fn bench_signal_set_same_value(c: &mut Criterion) {
    let runtime = Runtime::new();
    let s = runtime.signal(42i32);
    c.bench_function("signal_set_same_value", |b| b.iter(|| s.set(black_box(42))));
}

fn bench_effect_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("effect_fan_out");
    for subscribers in [1usize, 10, 100] {
        let runtime = Runtime::new();
        let s = runtime.signal(0u64);
        for _ in 0..subscribers {
            let s = s.clone();
            runtime.effect(move || {
                black_box(s.get());
            });
        }

        let mut next = 0;
        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &subscribers, |b, _| {
            b.iter(|| {
                next += 1;
                s.set(next)
            })
        });
    }
    group.finish();
}

fn bench_equal_nested_value(c: &mut Criterion) {
    let doc = r#"{"user": {"name": "ada", "tags": [1, 2, 3, 4, 5]}, "items": [{"id": 1}, {"id": 2}]}"#;
    let a = Value::from_json(doc).unwrap();
    let b = Value::from_json(doc).unwrap();
    c.bench_function("equal_nested_value", |bench| bench.iter(|| equal(black_box(&a), black_box(&b))));
}

criterion_group!(
    benches,
    bench_signal_get,
    bench_signal_set,
    bench_signal_set_same_value,
    bench_effect_fan_out,
    bench_equal_nested_value,
);
criterion_main!(benches);
