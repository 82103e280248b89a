use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::mixer::MAX_DELAY_SECONDS;
use crate::sequencing::clock::{MAX_BPM, MIN_BPM};
use crate::sequencing::generate::BasslinePrefs;
use crate::{SynthError, SynthResult, BUFFER_BYTES, CHANNELS};

/// Lowest base note whose octave-down steps stay in MIDI range.
pub const MIN_BASS_NOTE: u8 = 12;
/// Highest base note whose top interval an octave up stays in MIDI range.
pub const MAX_BASS_NOTE: u8 = 103;

/// How track outputs and effect returns are combined.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MixMode {
    /// Running blend: every source halves what came before it,
    /// `out = (out + source) / 2`. Later sources are louder and the overall
    /// level depends on how many sources there are.
    #[default]
    Average,
    /// Plain sum; sources keep their own gain staging.
    Sum,
}

/// Everything needed to build an engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub bpm: f64,
    pub master_volume: f64,
    /// Seed for pattern generation.
    pub seed: u32,
    pub mix_mode: MixMode,
    /// Bytes per rendered buffer; a whole number of stereo i16 frames.
    pub buffer_bytes: usize,
    /// Base MIDI note of generated basslines.
    pub bass_note: u8,
    pub prefer_bass_drum: bool,
    pub prefer_snare_drum: bool,
    /// Directory with `bd.raw`, `sd.raw`, ... drum samples.
    pub samples_dir: Option<PathBuf>,
    /// Raw PCM capture file.
    pub capture: Option<PathBuf>,
    pub delay_time: f64,
    pub delay_feedback: f64,
    pub reverb_room_size: f64,
    pub reverb_wet: f64,
    /// Capacity of the control message queue.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            master_volume: 0.8,
            seed: 1,
            mix_mode: MixMode::Average,
            buffer_bytes: BUFFER_BYTES,
            bass_note: 36,
            prefer_bass_drum: false,
            prefer_snare_drum: false,
            samples_dir: None,
            capture: None,
            delay_time: 0.375,
            delay_feedback: 0.45,
            reverb_room_size: 0.5,
            reverb_wet: 0.3,
            queue_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn bassline_prefs(&self) -> BasslinePrefs {
        BasslinePrefs {
            prefer_bass_drum: self.prefer_bass_drum,
            prefer_snare_drum: self.prefer_snare_drum,
        }
    }

    /// Frames per rendered buffer.
    pub fn buffer_frames(&self) -> usize {
        self.buffer_bytes / (CHANNELS * 2)
    }

    pub fn validate(&self) -> SynthResult<()> {
        if !(MIN_BPM..=MAX_BPM).contains(&self.bpm) {
            return Err(SynthError::configuration(
                "bpm",
                format!("{} is outside {MIN_BPM}..={MAX_BPM}", self.bpm),
            ));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(SynthError::configuration(
                "master_volume",
                format!("{} is outside 0..=1", self.master_volume),
            ));
        }
        let frame = CHANNELS * 2;
        if self.buffer_bytes == 0 || self.buffer_bytes % frame != 0 {
            return Err(SynthError::configuration(
                "buffer_bytes",
                format!("{} is not a positive multiple of {frame}", self.buffer_bytes),
            ));
        }
        // Steps reach twelve semitones plus an octave up, or an octave down.
        if !(MIN_BASS_NOTE..=MAX_BASS_NOTE).contains(&self.bass_note) {
            return Err(SynthError::configuration(
                "bass_note",
                format!(
                    "{} is outside {MIN_BASS_NOTE}..={MAX_BASS_NOTE}",
                    self.bass_note
                ),
            ));
        }
        if !(0.0..=MAX_DELAY_SECONDS).contains(&self.delay_time) {
            return Err(SynthError::configuration(
                "delay_time",
                format!("{} s is outside 0..={MAX_DELAY_SECONDS}", self.delay_time),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(SynthError::configuration("queue_capacity", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.buffer_frames(), 4096);
        assert_eq!(config.mix_mode, MixMode::Average);
    }

    #[test]
    fn bass_note_bounds_are_inclusive() {
        for bass_note in [MIN_BASS_NOTE, MAX_BASS_NOTE] {
            let config = EngineConfig {
                bass_note,
                ..Default::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            EngineConfig {
                bpm: 0.0,
                ..Default::default()
            },
            EngineConfig {
                master_volume: 1.5,
                ..Default::default()
            },
            EngineConfig {
                buffer_bytes: 1002,
                ..Default::default()
            },
            EngineConfig {
                bass_note: 120,
                ..Default::default()
            },
            EngineConfig {
                bass_note: MIN_BASS_NOTE - 1,
                ..Default::default()
            },
            EngineConfig {
                queue_capacity: 0,
                ..Default::default()
            },
            EngineConfig {
                delay_time: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }
}
