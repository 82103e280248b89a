//! Benchmarks for the stereo reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::dsp::reverb::Reverb;
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        let input: Vec<f64> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f64 / 10.0) // Initial impulse
                } else {
                    (i as f64 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        for (name, room, damp) in [("small_room", 0.3, 0.5), ("large_room", 0.9, 0.3)] {
            let mut reverb = Reverb::new(&ctx);
            reverb.set_room_size(room);
            reverb.set_damp(damp);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for &x in &input {
                        reverb.add_input(black_box(x), black_box(x));
                        let (l, r) = reverb.process();
                        sum += l + r;
                    }
                    sum
                })
            });
        }

        let mut reverb = Reverb::new(&ctx);
        reverb.set_mode(1.0);
        group.bench_with_input(BenchmarkId::new("frozen", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0;
                for &x in &input {
                    reverb.add_input(black_box(x), black_box(x));
                    let (l, r) = reverb.process();
                    sum += l + r;
                }
                sum
            })
        });
    }

    group.finish();
}
