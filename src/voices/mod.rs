//! Ready-to-play instruments.
//!
//! - [`AcidVoice`]: monophonic resonant bassline with accent and slide
//! - [`RhythmVoice`]: eight-sound drum machine, sampled or synthesized
//!
//! Both implement [`Instrument`](crate::synth::Instrument) and are driven by
//! the step sequencers or directly by note messages.

pub mod acid;
pub mod drum;
pub mod rhythm;

pub use acid::{AcidControl, AcidVoice, AcidWaveform};
pub use drum::{DrumKind, DrumParam, DrumSound};
pub use rhythm::RhythmVoice;
