//! Benchmarks for the ADR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::envelope::Envelope;
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        let mut env = Envelope::adr(&ctx, 500.0, 4.0, 10.0);
        group.bench_with_input(BenchmarkId::new("retriggered", size), &size, |b, &size| {
            b.iter(|| {
                env.attack();
                let mut sum = 0.0;
                for _ in 0..size {
                    sum += env.tick();
                }
                black_box(sum)
            })
        });

        let mut env = Envelope::adr(&ctx, 500.0, 4.0, 10.0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0;
                for _ in 0..size {
                    sum += env.tick();
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
