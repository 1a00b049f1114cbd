use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formhist_diff::{diff, reduce, RecordData, Snapshot, SnapshotChain};
use serde_json::json;

fn record(seed: usize) -> RecordData {
    let mut data = RecordData::new();
    for i in 0..50 {
        let value = match i % 5 {
            0 => json!(seed + i),
            1 => json!(format!("text-{}", seed % 3)),
            2 => json!(seed % 2 == 0),
            3 => json!(["a", "b", seed.to_string()]),
            _ => json!({"r1": "c1", "r2": {"c1": seed, "c2": [1, 2]}}),
        };
        data.insert(format!("field_{i}"), value);
    }
    data
}

fn bench_diff(c: &mut Criterion) {
    let before = record(1);
    let after = record(2);
    c.bench_function("diff_50_fields", |b| {
        b.iter(|| diff(black_box(Some(&before)), black_box(&after)));
    });
}

fn bench_reduce(c: &mut Criterion) {
    let created = chrono::Utc::now();
    let versions: Vec<Snapshot> = (0..100).map(|i| Snapshot::new(record(i), created)).collect();
    let chain = SnapshotChain::new(RecordData::new(), created)
        .with_versions(versions, Snapshot::new(record(100), created));
    c.bench_function("reduce_100_versions", |b| {
        b.iter(|| reduce(black_box(&chain)));
    });
}

criterion_group!(benches, bench_diff, bench_reduce);
criterion_main!(benches);
