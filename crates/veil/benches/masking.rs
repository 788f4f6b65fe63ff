//! Masking benchmarks.
#![allow(missing_docs)]

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use veil::extract::{IdentifierExtractor, LanguageConfig, SyntaxParser};
use veil::ranges::{self, Range};
use veil::test_utils::fixtures::{SAMPLE_PY, SAMPLE_TEXT};
use veil::test_utils::{ToyPythonParser, test_builder};
use veil::{Category, IssueContext, PatternDetector, TokenGenerator, TokenRequest};

fn bench_token_generation(c: &mut Criterion) {
    let generator = TokenGenerator::new(b"benchmark secret, thirty-two b!!");
    let mut group = c.benchmark_group("generate");

    let cases = [
        ("ident", "customer_name", Category::Ident),
        ("word", "confidential", Category::Word),
        ("email", "jane.roe@example.com", Category::Email),
        ("uuid", "123e4567-e89b-12d3-a456-426614174000", Category::Uuid),
        ("phone", "(555) 123-4567", Category::Phone),
    ];
    for (name, original, category) in cases {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut issued = IssueContext::new();
                generator.generate(
                    &TokenRequest::new(black_box(original), category, "bench"),
                    &mut issued,
                )
            });
        });
    }
    group.finish();
}

fn bench_range_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let text = "x".repeat(10_000);

    for count in &[10usize, 100, 1000] {
        let candidates: Vec<Range> = (0..*count)
            .map(|i| {
                let start = (i * 37) % 9_990;
                Range::new(start, start + 1 + i % 9, "token")
            })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| ranges::rewrite(black_box(&text), candidates.clone()));
        });
    }
    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let python = LanguageConfig::python();
    let root = ToyPythonParser.parse(SAMPLE_PY).unwrap();

    c.bench_function("extract_sample_py", |b| {
        b.iter(|| IdentifierExtractor::new(&python).extract(black_box(&root), SAMPLE_PY));
    });
}

fn bench_detection(c: &mut Criterion) {
    let detector = PatternDetector::new();
    c.bench_function("detect_sample_text", |b| {
        b.iter(|| detector.detect(black_box(SAMPLE_TEXT)));
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let masker = runtime.block_on(test_builder().build()).unwrap();
    let python = LanguageConfig::python();

    // Warm the store so the loop measures lookups, not first writes.
    let masked = runtime
        .block_on(masker.auto_mask(SAMPLE_PY, &ToyPythonParser, &python, "bench", false))
        .unwrap();
    let tokens: HashMap<String, String> = runtime.block_on(masker.store().token_map("bench"));

    c.bench_function("auto_mask_sample_py", |b| {
        b.iter(|| {
            runtime
                .block_on(masker.auto_mask(SAMPLE_PY, &ToyPythonParser, &python, "bench", false))
                .unwrap()
        });
    });
    c.bench_function("unmask_sample_py", |b| {
        b.iter(|| veil::unmask(black_box(&masked.text), &tokens));
    });
}

criterion_group!(
    benches,
    bench_token_generation,
    bench_range_resolution,
    bench_extraction,
    bench_detection,
    bench_round_trip
);
criterion_main!(benches);
