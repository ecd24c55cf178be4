//! Benchmarks for the line model, plan generation and suppression.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use unveil_core::lines::LineSequence;
use unveil_core::matcher::SubstringMatcher;
use unveil_core::plan::{StepMode, StepPlan};
use unveil_core::suppress::{suppress, SuppressionSelection};

fn synthetic_stream(lines: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in 0..lines {
        match i % 4 {
            0 => buf.extend_from_slice(b"q"),
            1 => buf.extend_from_slice(format!("1 0 0 1 {} {} cm", i % 612, i % 792).as_bytes()),
            2 => buf.extend_from_slice(format!("/Im{} Do", i % 50).as_bytes()),
            _ => buf.extend_from_slice(b"Q"),
        }
        buf.push(b'\n');
    }
    buf
}

fn bench_line_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("LineModel");
    let data = synthetic_stream(100_000);

    group.bench_function("split_100k", |b| {
        b.iter(|| black_box(LineSequence::split(black_box(&data))))
    });

    let seq = LineSequence::split(&data);
    group.bench_function("join_100k", |b| b.iter(|| black_box(seq.join())));

    group.bench_function("join_prefix_half", |b| {
        b.iter(|| black_box(seq.join_prefix(50_000)))
    });

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("StepPlan");

    group.bench_function("stride_1_over_100k", |b| {
        b.iter(|| black_box(StepPlan::new(0, 100_000, StepMode::Stride(1)).unwrap()))
    });

    group.bench_function("bins_1000_over_100k", |b| {
        b.iter(|| black_box(StepPlan::new(0, 100_000, StepMode::Bins(1000)).unwrap()))
    });

    group.finish();
}

fn bench_suppress(c: &mut Criterion) {
    let mut group = c.benchmark_group("Suppress");
    let seq = LineSequence::split(&synthetic_stream(100_000));
    let matcher = SubstringMatcher::draw_operator();

    group.bench_function("range_full_100k", |b| {
        let selection = SuppressionSelection::range(0, None);
        b.iter(|| black_box(suppress(&seq, &selection, &matcher, b"% ")))
    });

    group.bench_function("explicit_targets_100k", |b| {
        let selection = SuppressionSelection::range(0, Some(0)).with_targets((0..100_000).step_by(97));
        b.iter(|| black_box(suppress(&seq, &selection, &matcher, b"% ")))
    });

    group.finish();
}

criterion_group!(benches, bench_line_model, bench_plan, bench_suppress);
criterion_main!(benches);
