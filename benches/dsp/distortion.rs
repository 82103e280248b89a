//! Benchmarks for the soft clipper and decimator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::distortion::{Decimator, Distortion};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Sine at 2x gain so the clipper works on both sides of the knee.
        let input: Vec<f64> = (0..size).map(|i| (i as f64 * 0.05).sin() * 2.0).collect();

        for (name, ratio) in [("mild", 0.2), ("heavy", 0.9)] {
            let mut dist = Distortion::new(ratio);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &x in &input {
                        sum += dist.distort(black_box(x));
                    }
                    sum
                })
            });
        }

        let mut decimator = Decimator::new();
        group.bench_with_input(BenchmarkId::new("decimator", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for pair in input.chunks_exact(2) {
                    sum += decimator.process(black_box(pair[0]), black_box(pair[1]));
                }
                sum
            })
        });
    }

    group.finish();
}
