//! Check-digit benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use runscan_bench::{SizeTier, generate_cards};
use runscan_core::{Run, expected_check_char, is_valid_national_id};

fn bench_check_digit(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_digit");

    let cards = generate_cards(&SizeTier::Small.config(7));
    let runs: Vec<String> = cards
        .iter()
        .flat_map(|c| [c.planted.clone(), c.serial.clone()])
        .collect();
    let bodies: Vec<String> = runs
        .iter()
        .map(|r| r.split('-').next().unwrap_or_default().replace('.', ""))
        .collect();

    group.throughput(Throughput::Elements(runs.len() as u64));

    group.bench_with_input(BenchmarkId::new("validate", "dotted"), &runs, |b, runs| {
        b.iter(|| runs.iter().filter(|r| is_valid_national_id(r)).count());
    });

    group.bench_with_input(
        BenchmarkId::new("expected_check_char", "body"),
        &bodies,
        |b, bodies| {
            b.iter(|| {
                bodies
                    .iter()
                    .filter_map(|body| expected_check_char(body))
                    .count()
            });
        },
    );

    group.bench_with_input(BenchmarkId::new("parse", "Run"), &runs, |b, runs| {
        b.iter(|| {
            runs.iter()
                .filter(|r| Run::try_from(r.as_str()).is_ok())
                .count()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_check_digit);
criterion_main!(benches);
