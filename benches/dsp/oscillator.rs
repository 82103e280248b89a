//! Benchmarks for the computed and wavetable oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::oscillator::{CyclicTable, Oscillator, Waveform, WavetableOscillator};
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        for (name, waveform) in [
            ("sine", Waveform::Sine),
            ("saw", Waveform::Saw),
            ("square", Waveform::Square),
            ("noise", Waveform::Noise),
        ] {
            let mut osc = Oscillator::new(&ctx, waveform);
            osc.set_frequency(110.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for _ in 0..size {
                        sum += osc.tick();
                    }
                    black_box(sum)
                })
            });
        }

        let table = CyclicTable::saw(2048, 64).expect("valid table");
        let mut osc = WavetableOscillator::new(&ctx, table);
        osc.set_frequency(55.0);
        group.bench_with_input(BenchmarkId::new("wavetable", size), &size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0;
                for _ in 0..size {
                    sum += osc.tick();
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
