//! Benchmarks for full mixer buffers with the default tracks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use stepsynth::engine::{self, EngineConfig, MixMode};

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &bytes in &[1024usize, 16_384] {
        group.throughput(Throughput::Bytes(bytes as u64));

        for (name, mix_mode) in [("average", MixMode::Average), ("sum", MixMode::Sum)] {
            let config = EngineConfig {
                mix_mode,
                buffer_bytes: bytes,
                ..Default::default()
            };
            let mut mixer = engine::build_offline(&config).expect("engine");
            let mut buffer = vec![0u8; bytes];
            group.bench_with_input(BenchmarkId::new(name, bytes), &bytes, |b, _| {
                b.iter(|| mixer.render_buffer(black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}
