//! Measures per-event overhead of the calculator variants.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::collections::HashMap;

use intervalo::calculator::{
    Calculator, CheckpointIntervalCalculator, ThreadIntervalCalculator,
};
use intervalo::checkpoint::CheckpointIndex;
use intervalo::event::TraceEvent;

fn synthetic_round(round: u64) -> Vec<TraceEvent> {
    ["a:x", "a:y", "a:z"]
        .iter()
        .enumerate()
        .map(|(i, name)| TraceEvent {
            pid: 1,
            thread_id: 100,
            name: name.to_string(),
            extra_name: None,
            timestamp: round * 100 + i as u64 * 10,
            fields: HashMap::new(),
        })
        .collect()
}

fn bench_interval_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("interval_observe");
    group.throughput(Throughput::Elements(3));
    group.bench_function("complete_round", |b| {
        let index = CheckpointIndex::build(&["a:x", "a:y", "a:z"]).unwrap();
        let mut calc = CheckpointIntervalCalculator::new(index);
        let mut round = 0u64;
        b.iter(|| {
            round += 1;
            for ev in synthetic_round(round) {
                calc.observe(black_box(&ev));
            }
        });
    });
    group.finish();
}

fn bench_thread_interval_observe(c: &mut Criterion) {
    c.bench_function("thread_interval_observe", |b| {
        let index = CheckpointIndex::build::<&str>(&[]).unwrap();
        let mut calc = ThreadIntervalCalculator::new(index);
        let mut ts = 0u64;
        b.iter(|| {
            ts += 7;
            let ev = TraceEvent {
                pid: 1,
                thread_id: 100,
                name: "timer:tick".to_string(),
                extra_name: None,
                timestamp: ts,
                fields: HashMap::new(),
            };
            calc.observe(black_box(&ev));
        });
    });
}

criterion_group!(benches, bench_interval_observe, bench_thread_interval_observe);
criterion_main!(benches);
