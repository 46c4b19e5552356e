//! Benchmarks for the request decode path
//!
//! Covers the work done per device request:
//! - CRC-16 over a full setting frame
//! - Envelope parsing of captured `getsetting` and `cache` bodies
//! - Setting request decode, response build and encode

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use hpcount_core::{checksum, CacheRequest, CodecConfig, Envelope, SettingRequest};
use std::hint::black_box;

const GETSETTING: &str = "cmd=getsetting&flag=022E&data=0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B80C0";
const CACHE: &str = "cmd=cache&flag=1E28&status=010142AE51520156000D0001E6A7\
                     &data=15050D0D332A000100000000000000E97E\
                     &data=15050D0D332C000000000001000000C65E&count=2";

fn bench_checksum(c: &mut Criterion) {
    let envelope = Envelope::parse(GETSETTING).expect("captured request parses");
    let frame = envelope.data[0].clone();
    let body = &frame[..frame.len() - 2];

    let mut group = c.benchmark_group("checksum");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("setting_body", |b| {
        b.iter(|| black_box(checksum::calculate(black_box(body))))
    });
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    c.bench_function("parse_getsetting", |b| {
        b.iter(|| black_box(Envelope::parse(black_box(GETSETTING))))
    });

    c.bench_function("parse_cache", |b| {
        b.iter(|| black_box(Envelope::parse(black_box(CACHE))))
    });
}

fn bench_frames(c: &mut Criterion) {
    let envelope = Envelope::parse(GETSETTING).expect("captured request parses");
    let frame = envelope.data[0].clone();

    c.bench_function("setting_round_trip", |b| {
        b.iter(|| {
            let request = SettingRequest::decode(black_box(&frame)).expect("valid frame");
            let response = request.response(envelope.flag);
            black_box(response.encode())
        })
    });

    let cache = Envelope::parse(CACHE).expect("captured request parses");
    let lenient = CodecConfig::default().with_status_checksum(false);

    c.bench_function("cache_decode", |b| {
        b.iter(|| black_box(CacheRequest::decode_with(black_box(&cache), &lenient)))
    });
}

criterion_group!(benches, bench_checksum, bench_envelope, bench_frames);
criterion_main!(benches);
