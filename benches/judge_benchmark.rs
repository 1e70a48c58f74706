use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lanefall::chart::{Chart, Note};
use lanefall::config::JudgeWindowConfig;
use lanefall::engine::{JudgeWindows, Timeline};

fn classify_benchmark(c: &mut Criterion) {
    let windows = JudgeWindows::new(&JudgeWindowConfig::default());

    c.bench_function("classify_delta_sweep", |b| {
        b.iter(|| {
            for delta in -60..=500 {
                let _ = black_box(windows.classify(black_box(f64::from(delta))));
            }
        });
    });
}

fn candidate_selection_benchmark(c: &mut Criterion) {
    let windows = JudgeWindows::new(&JudgeWindowConfig::default());
    let notes: Vec<Note> = (0..64)
        .map(|i| Note::short((i % 4) as usize, f64::from(i) * 50.0))
        .collect();
    let mut timeline = Timeline::default();
    timeline.bind(&Chart::new(notes), 0.0);
    timeline.promote(0.0, 10_000.0);

    c.bench_function("closest_pressable_64_active", |b| {
        b.iter(|| {
            let _ = black_box(timeline.closest_pressable(black_box(2), 1500.0, &windows));
        });
    });
}

criterion_group!(benches, classify_benchmark, candidate_selection_benchmark);
criterion_main!(benches);
