//! Benchmarks for the two instruments while they are sounding.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stepsynth::synth::Instrument;
use stepsynth::voices::{AcidVoice, DrumKind, RhythmVoice};
use stepsynth::EngineContext;

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = EngineContext::default();

    for &size in BLOCK_SIZES {
        let mut acid = AcidVoice::new(&ctx).expect("acid voice");
        group.bench_with_input(BenchmarkId::new("acid", size), &size, |b, &size| {
            b.iter(|| {
                acid.note_on(36, 230).expect("valid note");
                let mut sum = 0.0;
                for _ in 0..size {
                    sum += acid.next_frame().left;
                }
                black_box(sum)
            })
        });

        // Every drum at once: the worst case for one step.
        let mut drums = RhythmVoice::new(&ctx).expect("rhythm voice");
        group.bench_with_input(BenchmarkId::new("all_drums", size), &size, |b, &size| {
            b.iter(|| {
                for kind in DrumKind::ALL {
                    drums.note_on(kind.note(), 230).expect("drum note");
                }
                let mut sum = 0.0;
                for _ in 0..size {
                    let frame = drums.next_frame();
                    sum += frame.left + frame.right;
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
