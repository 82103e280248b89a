//! Step sequencing: sixteen-step patterns, the half-step clock that plays
//! them, and the generators that write them.

pub mod clock;
pub mod generate;
pub mod pattern;
pub mod sequencer;

pub use clock::{StepClock, StepEvent};
pub use generate::{
    create_bassline, create_rhythm, pick, randomize_rhythm, randomize_sequence, BasslinePrefs,
    Syncopation,
};
pub use pattern::{BasslinePattern, RhythmPattern, Step, STEPS};
pub use sequencer::{BasslineSequencer, RhythmSequencer, Sequencer};
