//! Extraction benchmarks over generated card text.
#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use runscan_bench::{SizeTier, generate_cards};
use runscan_core::{Extractor, extract_national_id};

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let extractor = Extractor::default();

    for (name, tier) in [
        ("S", SizeTier::Small),
        ("M", SizeTier::Medium),
        ("L", SizeTier::Large),
    ] {
        let cards = generate_cards(&tier.config(42));
        let bytes: u64 = cards.iter().map(|c| c.text.len() as u64).sum();

        group.throughput(Throughput::Bytes(bytes));

        group.bench_with_input(BenchmarkId::new("extractor", name), &cards, |b, cards| {
            b.iter(|| {
                for card in cards {
                    let _ = extractor.extract(&card.text);
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("extract_national_id", name),
            &cards,
            |b, cards| {
                b.iter(|| {
                    for card in cards {
                        let _ = extract_national_id(&card.text);
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("candidates", name), &cards, |b, cards| {
            b.iter(|| {
                for card in cards {
                    let _ = extractor.candidates(&card.text);
                }
            });
        });
    }
    group.finish();
}

fn bench_extractor_construction(c: &mut Criterion) {
    c.bench_function("extractor_new", |b| {
        b.iter(Extractor::default);
    });
}

criterion_group!(benches, bench_extract, bench_extractor_construction);
criterion_main!(benches);
