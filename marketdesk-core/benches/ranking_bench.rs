//! Criterion benchmarks for the normalizer hot path.
//!
//! Benchmarks:
//! 1. Frame construction from raw JSON records (NSE and BSE field maps)
//! 2. Ranking both directions at the standard table size

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marketdesk_core::data::{FieldMap, QuoteFrame, RawRecord};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_records(n: usize) -> Vec<RawRecord> {
    (0..n)
        .map(|i| {
            let last = 100.0 + (i as f64 * 0.37).sin() * 10.0;
            let value = json!({
                "symbol": format!("SYM{i}"),
                "open": last - 0.5,
                "dayHigh": last + 1.0,
                "dayLow": last - 1.0,
                "lastPrice": last,
                "previousClose": 100.0,
                "pChange": format!("{:.2}", last - 100.0),
            });
            serde_json::from_value(value).unwrap()
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_frame_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_build");
    for n in [51, 500, 5_000] {
        let records = make_records(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| QuoteFrame::from_records(black_box(records), &FieldMap::NSE).unwrap())
        });
    }
    group.finish();
}

fn bench_movers(c: &mut Criterion) {
    let mut group = c.benchmark_group("movers");
    for n in [51, 500, 5_000] {
        let frame = QuoteFrame::from_records(&make_records(n), &FieldMap::NSE).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &frame, |b, frame| {
            b.iter(|| black_box(frame).movers().unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_frame_build, bench_movers);
criterion_main!(benches);
