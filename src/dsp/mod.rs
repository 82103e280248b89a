//! Low-level DSP primitives used by the voices and the mixer.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! making them safe to embed directly inside voice structs. Each instance is
//! owned by exactly one thread; nothing here is shared across threads.

/// Single feedback delay line used as a send effect.
pub mod delay;
/// Soft-clip waveshaper and half-band decimator.
pub mod distortion;
/// Attack/decay/release envelope generator.
pub mod envelope;
/// One-pole, four-pole and DC-blocking filters.
pub mod filter;
/// Periodic and wavetable oscillators.
pub mod oscillator;
/// Comb and all-pass filters and the Freeverb network built from them.
pub mod reverb;

pub use envelope::EnvelopeStage;
