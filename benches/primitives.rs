use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hwprim::num::{NumBackend, Primitives};
use std::hint::black_box;

const BACKENDS: [(&str, NumBackend); 2] =
    [("hardware", NumBackend::Hardware), ("portable", NumBackend::Portable)];

fn rotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotate");
    for (name, backend) in BACKENDS {
        group.bench_with_input(BenchmarkId::new("rol64", name), &backend, |b, backend| {
            b.iter(|| backend.rol64(black_box(0x0123_4567_89AB_CDEF), black_box(13)))
        });
        group.bench_with_input(BenchmarkId::new("ror8", name), &backend, |b, backend| {
            b.iter(|| backend.ror8(black_box(0x81), black_box(3)))
        });
    }
    group.finish();
}

fn multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply_high");
    for (name, backend) in BACKENDS {
        group.bench_with_input(BenchmarkId::new("umulh64", name), &backend, |b, backend| {
            b.iter(|| backend.umulh64(black_box(u64::MAX - 7), black_box(0xDEAD_BEEF_CAFE)))
        });
        group.bench_with_input(BenchmarkId::new("mulh64", name), &backend, |b, backend| {
            b.iter(|| backend.mulh64(black_box(-0x1234_5678_9ABC), black_box(i64::MAX - 3)))
        });
    }
    group.finish();
}

fn divide(c: &mut Criterion) {
    let mut group = c.benchmark_group("divide");
    for (name, backend) in BACKENDS {
        group.bench_with_input(BenchmarkId::new("udiv128", name), &backend, |b, backend| {
            b.iter(|| backend.udiv128(black_box(0x1234), black_box(u64::MAX), black_box(0x1_0000_0001)))
        });
        group.bench_with_input(BenchmarkId::new("div128", name), &backend, |b, backend| {
            b.iter(|| backend.div128(black_box(-0x1234), black_box(7), black_box(0x7FFF_0001)))
        });
    }
    group.finish();
}

fn zeros(c: &mut Criterion) {
    let mut group = c.benchmark_group("zeros");
    group.bench_function("ctz128/hardware", |b| {
        b.iter(|| hwprim::num::Hardware::ctz128(black_box(1 << 100)))
    });
    group.bench_function("ctz128/portable", |b| {
        b.iter(|| hwprim::num::Portable::ctz128(black_box(1 << 100)))
    });
    group.bench_function("clz128/hardware", |b| {
        b.iter(|| hwprim::num::Hardware::clz128(black_box(1 << 20)))
    });
    group.bench_function("clz128/portable", |b| {
        b.iter(|| hwprim::num::Portable::clz128(black_box(1 << 20)))
    });
    group.finish();
}

criterion_group!(benches, rotate, multiply, divide, zeros);
criterion_main!(benches);
