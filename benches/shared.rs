// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Shared region allocation benchmarks.
//
// Run with:
//   cargo bench --bench shared
//
// Groups:
//   shared_alloc_free: mmap + munmap round trip
//   shared_touch     : allocate, write every page once, free

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use procvisor::shared;

const PAGE: usize = 4096;

const SIZES: &[(&str, usize)] = &[
    ("word_8", 8),
    ("page_4k", PAGE),
    ("large_1m", 1024 * 1024),
];

fn bench_alloc_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_alloc_free");

    for &(label, size) in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &size, |b, &sz| {
            b.iter(|| {
                let region = shared::allocate(black_box(sz)).expect("allocate");
                unsafe { shared::free(region).expect("free") };
            });
        });
    }

    group.finish();
}

fn bench_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared_touch");

    for &(label, size) in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &size, |b, &sz| {
            b.iter(|| {
                let region = shared::allocate(sz).expect("allocate");
                unsafe {
                    let bytes = region.as_mut_slice();
                    for offset in (0..sz).step_by(PAGE) {
                        bytes[offset] = 1;
                    }
                    black_box(bytes[0]);
                    shared::free(region).expect("free");
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_alloc_free, bench_touch);
criterion_main!(benches);
