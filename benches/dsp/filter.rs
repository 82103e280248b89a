//! Benchmarks for the one-pole, four-pole and DC-blocking filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::filter::{DcBlocker, FourPole, OnePole};
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f64> = (0..size)
            .map(|i| (i as f64 / size as f64) * 2.0 - 1.0)
            .collect();

        let mut filter = OnePole::lowpass(&ctx, 1000.0).expect("valid cutoff");
        group.bench_with_input(BenchmarkId::new("one_pole", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &x in &input {
                    sum += filter.process(black_box(x));
                }
                sum
            })
        });

        let mut filter = FourPole::lowpass(&ctx, 800.0).expect("valid cutoff");
        filter.set_resonance(0.8);
        group.bench_with_input(BenchmarkId::new("four_pole", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &x in &input {
                    sum += filter.process(black_box(x));
                }
                sum
            })
        });

        // Cutoff swept every sample, as the acid voice does.
        let mut filter = FourPole::lowpass(&ctx, 800.0).expect("valid cutoff");
        filter.set_resonance(0.8);
        group.bench_with_input(BenchmarkId::new("four_pole_swept", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for (i, &x) in input.iter().enumerate() {
                    filter.set_cutoff(200.0 + i as f64);
                    sum += filter.process(black_box(x));
                }
                sum
            })
        });

        let mut dc = DcBlocker::new(&ctx, 10.0).expect("valid cutoff");
        group.bench_with_input(BenchmarkId::new("dc_blocker", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &x in &input {
                    sum += dc.process(black_box(x));
                }
                sum
            })
        });
    }

    group.finish();
}
