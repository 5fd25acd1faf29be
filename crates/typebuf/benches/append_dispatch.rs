// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use typebuf::{DispatchVisitor, TypedBuffer};

const VALUES: usize = 1024;

fn filled_buffer() -> TypedBuffer {
    let mut buf = TypedBuffer::new();
    for i in 0..VALUES {
        let appended = match i % 3 {
            0 => buf.append(i as i32),
            1 => buf.append(i as f64),
            _ => buf.append([i as u8; 3]),
        };
        appended.expect("append");
    }
    buf
}

fn bench_append(c: &mut Criterion) {
    c.bench_function("append_1024_mixed", |b| {
        b.iter(|| black_box(filled_buffer()))
    });

    c.bench_function("append_1024_preallocated", |b| {
        b.iter_batched(
            || {
                let config = typebuf::BufferConfig::default().with_initial_capacity(VALUES * 8);
                TypedBuffer::with_config(config).expect("valid config")
            },
            |mut buf| {
                for i in 0..VALUES as u64 {
                    buf.append(black_box(i)).expect("append");
                }
                buf
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let mut buf = filled_buffer();

    c.bench_function("dispatch_1024_read", |b| {
        let mut sum = 0i64;
        let mut visitor = DispatchVisitor::new(&mut buf);
        visitor.register::<i32, _>(|v| sum += i64::from(*v));
        b.iter(|| black_box(visitor.dispatch().expect("dispatch")))
    });

    c.bench_function("dispatch_1024_mutate", |b| {
        let mut visitor = DispatchVisitor::new(&mut buf);
        visitor.register::<f64, _>(|v| *v *= 1.000_001);
        visitor.register::<[u8; 3], _>(|rgb| rgb[0] = rgb[0].wrapping_add(1));
        b.iter(|| black_box(visitor.dispatch().expect("dispatch")))
    });
}

criterion_group!(benches, bench_append, bench_dispatch);
criterion_main!(benches);
