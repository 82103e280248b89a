//! Scenario benchmarks: whole voices and the full mixer.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
