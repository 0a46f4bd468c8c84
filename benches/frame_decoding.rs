//! Benchmarks for datagram decoding
//!
//! The live listener decodes one 331-byte datagram per 16.67 ms tick; both
//! decoders must stay far below that budget:
//! - TelemetryFrame decoding on every datagram
//! - StaticSessionInfo decoding with catalog resolution at race start

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use datasport::{
    CarCatalog, CarRecord, Catalogs, StaticSessionInfo, TelemetryFrame, TrackCatalog, TrackRecord,
    DATAGRAM_LEN,
};
use std::hint::black_box;

/// A datagram with realistic mid-race values at the documented offsets.
fn race_datagram() -> [u8; DATAGRAM_LEN] {
    let mut raw = [0u8; DATAGRAM_LEN];
    raw[0..4].copy_from_slice(&1i32.to_le_bytes()); // is_race_on
    raw[4..8].copy_from_slice(&3_600_000u32.to_le_bytes()); // timestamp_ms
    raw[8..12].copy_from_slice(&7500.0f32.to_le_bytes()); // engine_max_rpm
    raw[12..16].copy_from_slice(&850.0f32.to_le_bytes()); // engine_idle_rpm
    raw[16..20].copy_from_slice(&5200.0f32.to_le_bytes()); // current_engine_rpm
    raw[212..216].copy_from_slice(&2740i32.to_le_bytes()); // car_ordinal
    raw[216..220].copy_from_slice(&3i32.to_le_bytes()); // car_class
    raw[244..248].copy_from_slice(&62.0f32.to_le_bytes()); // speed
    raw[307] = 4; // gear
    raw[327..331].copy_from_slice(&21i32.to_le_bytes()); // track_ordinal
    raw
}

fn catalogs() -> Catalogs {
    Catalogs::new(
        CarCatalog::new([(
            2740,
            CarRecord { year: 2017, make: "Abarth".into(), model: "124 Spider".into() },
        )]),
        TrackCatalog::new([(
            21,
            TrackRecord {
                circuit: "Maple Valley".into(),
                location: "Vermont".into(),
                country: "United States".into(),
                track_name: "Full Circuit".into(),
                length_km: 4.8,
            },
        )]),
    )
}

fn bench_frame_decode(c: &mut Criterion) {
    let raw = race_datagram();

    let mut group = c.benchmark_group("frame_decode");
    group.throughput(Throughput::Bytes(DATAGRAM_LEN as u64));

    group.bench_function("decode_full_frame", |b| {
        b.iter(|| black_box(TelemetryFrame::decode(black_box(&raw))))
    });

    group.finish();
}

fn bench_static_decode(c: &mut Criterion) {
    let raw = race_datagram();
    let catalogs = catalogs();

    c.bench_function("decode_static_with_catalog_lookup", |b| {
        b.iter(|| black_box(StaticSessionInfo::decode(black_box(&raw), black_box(&catalogs))))
    });
}

criterion_group!(benches, bench_frame_decode, bench_static_decode);
criterion_main!(benches);
