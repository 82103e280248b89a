//! Benchmarks for the feedback delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::delay::Delay;
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.01).sin()).collect();

        for (name, seconds, feedback) in [("short", 0.05, 0.3), ("long_feedback", 0.375, 0.9)] {
            let mut delay = Delay::new(&ctx, 2.0);
            delay.set_time(seconds);
            delay.set_feedback(feedback);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &x in &input {
                        delay.input(black_box(x));
                        sum += delay.output();
                    }
                    sum
                })
            });
        }
    }

    group.finish();
}
