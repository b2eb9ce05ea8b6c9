//! Ring buffer write/read throughput

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ring_buffer::{Quote, QuotePool, RingBuffer};
use std::sync::Arc;

fn write_read_cycle(c: &mut Criterion) {
    let buffer = RingBuffer::new(1024, Arc::new(QuotePool::new())).unwrap();
    let quote = Quote::new("AAPL", 123.45, 1500, "NASDAQ");

    c.bench_function("try_write_then_try_read", |b| {
        b.iter_batched(
            || quote.clone(),
            |q| {
                black_box(buffer.try_write(q));
                black_box(buffer.try_read());
            },
            BatchSize::SmallInput,
        )
    });
}

fn fill_and_drain(c: &mut Criterion) {
    let quote = Quote::new("TSLA", 140.0, 2000, "NASDAQ");

    c.bench_function("fill_and_drain_256", |b| {
        b.iter_batched(
            || RingBuffer::new(256, Arc::new(QuotePool::with_limit(256))).unwrap(),
            |buffer| {
                while buffer.try_write(quote.clone()) {}
                while let Some(q) = buffer.try_read() {
                    black_box(q.price);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, write_read_cycle, fill_and_drain);
criterion_main!(benches);
