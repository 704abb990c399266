//! Scanner benchmarks.
//!
//! Run with: `cargo bench --package minicc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use minicc_lex::{Scanner, TokenKind};

fn token_count(source: &str) -> usize {
    let mut scanner = Scanner::new(source);
    let mut count = 0;
    while scanner.next_token().0.kind != TokenKind::Eof {
        count += 1;
    }
    count
}

fn bench_scanner_statements(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    let source = "void main(void){ int x; x = 1; if (x == 1) output(x) else output(0) endif; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("declaration", |b| {
        b.iter(|| token_count(black_box("int x; int arr[10];")))
    });

    group.bench_function("function_with_body", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_scanner_large_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner_large");

    let unit = "for (i = 0; i < 100; i = i + 1) { total = total + i * 2; } /* loop */\n";
    let source = unit.repeat(500);
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("repeated_loops", |b| {
        b.iter(|| token_count(black_box(&source)))
    });

    group.finish();
}

criterion_group!(benches, bench_scanner_statements, bench_scanner_large_input);
criterion_main!(benches);
