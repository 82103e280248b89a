pub mod context;
pub mod dsp; // Oscillators, envelopes, filters, effects
pub mod engine; // Mixing and output loop
pub mod error;
pub mod io;
pub mod sequencing; // Step patterns and pattern generation
pub mod synth; // Instrument trait and control messages
pub mod voices; // Acid bassline and drum machine

pub use context::EngineContext;
pub use error::{SynthError, SynthResult};

/// Sample rate every coefficient in the crate is derived from by default.
pub const SAMPLE_RATE: f64 = 44_100.0;
/// Output channels (interleaved stereo).
pub const CHANNELS: usize = 2;
/// Bytes rendered per mixing-loop iteration.
pub const BUFFER_BYTES: usize = 16_384;
/// Stereo frames per mixing-loop iteration (16-bit samples).
pub const BUFFER_FRAMES: usize = BUFFER_BYTES / (CHANNELS * 2);

/// Added to recursive filter memories so silence never decays into subnormals.
pub(crate) const DENORMAL_GUARD: f64 = 1e-38;
