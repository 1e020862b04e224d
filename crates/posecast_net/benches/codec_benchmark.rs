//! Wire codec benchmarks.
//!
//! Both feeds encode on the hot path (up to 1 kHz per feed) and the
//! receiver decodes every multicast datagram on the segment, so the codec
//! has to stay in the tens-of-nanoseconds range.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use posecast_core::{Pose, Vec3};
use posecast_net::protocol::{
    decode_telemetry, encode_motion, encode_telemetry, MotionRecord, TelemetryRecord,
};

fn bench_encode_motion(c: &mut Criterion) {
    let record = MotionRecord {
        position: Vec3::new(12.5, -3.0, 0.5),
        velocity: Vec3::new(8.3, 0.0, 0.0),
        orientation: Vec3::new(0.0, 0.0, 1.57),
        ..MotionRecord::default()
    };
    c.bench_function("encode_motion", |b| {
        b.iter(|| encode_motion(black_box(&record)));
    });
}

fn bench_encode_telemetry(c: &mut Criterion) {
    let record = TelemetryRecord::new(5551.0, 42_000, 1_234_567.0, Pose::IDENTITY);
    c.bench_function("encode_telemetry", |b| {
        b.iter(|| encode_telemetry(black_box(&record)));
    });
}

fn bench_decode_telemetry(c: &mut Criterion) {
    let encoded = encode_telemetry(&TelemetryRecord::new(
        5551.0,
        42_000,
        1_234_567.0,
        Pose::IDENTITY,
    ));
    c.bench_function("decode_telemetry", |b| {
        b.iter(|| decode_telemetry(black_box(&encoded)));
    });
}

criterion_group!(
    benches,
    bench_encode_motion,
    bench_encode_telemetry,
    bench_decode_telemetry
);
criterion_main!(benches);
