#[macro_use]
extern crate criterion;

use bytes::Bytes;
use criterion::{black_box, Criterion};

use vidlink_protocol::{extract_parameter_sets, parse_verified_data_packet, xor_checksum};

// Baseline profile SPS/PPS followed by the start of an IDR slice.
const NAL_DATA: &[u8] = &[
    0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E, 0xDA, 0x02, 0x80, 0xBF, 0xE5, // SPS
    0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80, // PPS
    0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84, 0x00, 0x33, 0xFF, // IDR
];

fn data_frame() -> Bytes {
    let length = (5 + NAL_DATA.len()) as u16;
    let mut frame = length.to_be_bytes().to_vec();
    frame.extend_from_slice(&[0x01, 0x01, 0x03]);
    frame.extend_from_slice(NAL_DATA);
    frame.push(xor_checksum(&frame));
    Bytes::from(frame)
}

fn benchmark_data_packet_parsing(c: &mut Criterion) {
    let frame = data_frame();

    c.bench_function("data_packet_parsing", |b| {
        b.iter(|| {
            black_box(parse_verified_data_packet(&frame)).unwrap();
        })
    });
}

fn benchmark_parameter_set_extraction(c: &mut Criterion) {
    c.bench_function("parameter_set_extraction", |b| {
        b.iter(|| {
            black_box(extract_parameter_sets(black_box(NAL_DATA))).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_data_packet_parsing,
    benchmark_parameter_set_extraction
);
criterion_main!(benches);
