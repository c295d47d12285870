//! Criterion benchmarks for the navigation text codec.
//!
//! Measures request encoding and response decoding for the frames the
//! dashboard sends most often.
//!
//! Run with:
//! ```bash
//! cargo bench --package nav-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav_core::domain::payload::{parse_locations, parse_path};
use nav_core::protocol::{decode_response, encode_request, OperationCode, Params, Request};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_add_road() -> Request {
    Request {
        session_id: 5,
        request_seq: 9,
        operation: OperationCode::AddRoad,
        params: Params::new()
            .with("sourceId", "1")
            .with("destId", "2")
            .with("distance", "3.5")
            .with("roadName", "Main St")
            .with("bidirectional", "1"),
    }
}

fn make_locations_line(count: usize) -> String {
    let listing = (1..=count)
        .map(|i| format!("{i}:Location {i}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("5|3|0|Retrieved {count} locations|count={count};locations={listing}")
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let req = make_add_road();
    c.bench_function("encode_request/add_road", |b| {
        b.iter(|| encode_request(black_box(&req)).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let short = "5|3|1|Not\\pFound";
    c.bench_function("decode_response/escaped_message", |b| {
        b.iter(|| decode_response(black_box(short)).unwrap())
    });

    let listing = make_locations_line(200);
    c.bench_function("decode_response/200_locations", |b| {
        b.iter(|| {
            let resp = decode_response(black_box(&listing)).unwrap();
            parse_locations(&resp.payload).unwrap()
        })
    });

    let path = "5|4|0|Path found|path=Home(1)->Mall(2)->Park(3)->Station(4);distance=12.34";
    c.bench_function("decode_response/path", |b| {
        b.iter(|| {
            let resp = decode_response(black_box(path)).unwrap();
            parse_path(&resp.payload).unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
