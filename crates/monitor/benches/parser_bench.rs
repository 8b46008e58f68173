//! 파서/중복 제거 벤치마크
//!
//! 로그 블롭 파싱과 fingerprint 필터링의 처리량을 측정합니다.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use logvigil_monitor::dedup::SeenLines;
use logvigil_monitor::parser::parse_blob;

/// nginx 스타일 에러 라인
const ERROR_LINE: &str = "2025/05/26 08:10:32 [error] 1234#0: *5678 upstream timed out \
    (110: Connection timed out) while reading response header from upstream, \
    client: 203.0.113.45, server: example.com, request: \"GET /api/v1/users HTTP/1.1\"";

fn make_blob(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("{ERROR_LINE} request_id={i}\n"))
        .collect()
}

fn bench_parse_blob(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_blob");

    group.throughput(Throughput::Elements(1));
    group.bench_function("single_line", |b| {
        b.iter(|| parse_blob(black_box(ERROR_LINE)))
    });

    let blob = make_blob(1000);
    group.throughput(Throughput::Elements(1000));
    group.bench_function("throughput_1000", |b| b.iter(|| parse_blob(black_box(&blob))));

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup");

    let lines = parse_blob(&make_blob(1000));

    group.throughput(Throughput::Elements(1000));
    group.bench_function("filter_unseen_cold", |b| {
        let seen = SeenLines::new(10_000, 5_000);
        b.iter(|| seen.filter_unseen(black_box(&lines)))
    });

    group.bench_function("filter_unseen_warm", |b| {
        let mut seen = SeenLines::new(10_000, 5_000);
        seen.absorb(&lines);
        b.iter(|| seen.filter_unseen(black_box(&lines)))
    });

    group.bench_function("absorb_and_trim", |b| {
        b.iter(|| {
            let mut seen = SeenLines::new(500, 250);
            seen.absorb(black_box(&lines));
            seen.enforce_capacity()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_blob, bench_dedup);
criterion_main!(benches);
