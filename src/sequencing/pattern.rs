/*
Step Patterns
=============

A pattern is one bar of sixteen steps (sixteenth notes). Two kinds exist:

Bassline
--------

Every step carries a note and a handful of performance flags:

  note      Semitone above the pattern's base note (0..=12)
  pause     Rest: no note is played on this step
  accent    Louder, with a deeper filter sweep
  slide     Hold the gate into the next step. The next note glides in
            without retriggering; a slide into a rest ties the note through it
  up/down   Transpose this step one octave up or down

  step      1   2   3   4   5   6   7   8   9  10  11  12  13  14  15  16
  note      C   C   -   D#  C   -   G   G   C   -   A#  C   -   C   D#  -
  flags     A       P   S       P   U           P   A       P           P

Rhythm
------

One boolean lane per drum sound plus a shared accent lane:

  bass drum  x . . . x . . . x . . . x . . .
  snare      . . . . x . . . . . . . x . . .
  closed hat . . x . . . x . . . x . . . x .
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ensure_range;
use crate::voices::drum::{DrumKind, DRUM_COUNT};
use crate::SynthResult;

/// Steps per pattern.
pub const STEPS: usize = 16;

/// One step of a bassline.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Step {
    pub note: u8,
    pub pause: bool,
    pub accent: bool,
    pub slide: bool,
    pub up: bool,
    pub down: bool,
}

impl Step {
    pub fn note(note: u8) -> Self {
        Self {
            note,
            ..Self::default()
        }
    }

    pub fn rest() -> Self {
        Self {
            pause: true,
            ..Self::default()
        }
    }

    pub fn with_accent(mut self) -> Self {
        self.accent = true;
        self
    }

    pub fn with_slide(mut self) -> Self {
        self.slide = true;
        self
    }

    pub fn up(mut self) -> Self {
        self.up = true;
        self.down = false;
        self
    }

    pub fn down(mut self) -> Self {
        self.down = true;
        self.up = false;
        self
    }

    /// Octave shift in semitones.
    pub fn transpose(&self) -> i32 {
        match (self.up, self.down) {
            (true, false) => 12,
            (false, true) => -12,
            _ => 0,
        }
    }
}

/// Sixteen bassline steps over a base MIDI note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasslinePattern {
    pub steps: [Step; STEPS],
    pub base_note: u8,
}

impl BasslinePattern {
    pub fn new(base_note: u8) -> Self {
        Self {
            steps: [Step::rest(); STEPS],
            base_note,
        }
    }

    /// MIDI pitch of `step` (wrapped to the pattern length).
    pub fn pitch(&self, step: usize) -> SynthResult<u8> {
        let s = &self.steps[step % STEPS];
        let pitch = self.base_note as i32 + s.note as i32 + s.transpose();
        ensure_range("pitch", pitch as i64, 0, 127)?;
        Ok(pitch as u8)
    }

    pub fn step(&self, step: usize) -> &Step {
        &self.steps[step % STEPS]
    }

    /// Number of steps that play a note.
    pub fn note_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.pause).count()
    }
}

impl Default for BasslinePattern {
    fn default() -> Self {
        Self::new(36)
    }
}

/// One lane of hits.
pub type Lane = [bool; STEPS];

/// Hit grid for every drum sound.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RhythmPattern {
    pub hits: [Lane; DRUM_COUNT],
    pub accents: Lane,
}

impl RhythmPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lane(&self, drum: DrumKind) -> &Lane {
        &self.hits[drum.index()]
    }

    pub fn lane_mut(&mut self, drum: DrumKind) -> &mut Lane {
        &mut self.hits[drum.index()]
    }

    pub fn set(&mut self, drum: DrumKind, step: usize, hit: bool) {
        self.hits[drum.index()][step % STEPS] = hit;
    }

    pub fn is_hit(&self, drum: DrumKind, step: usize) -> bool {
        self.hits[drum.index()][step % STEPS]
    }

    /// Drums that fire on `step`.
    pub fn hits_at(&self, step: usize) -> impl Iterator<Item = DrumKind> + '_ {
        DrumKind::ALL
            .into_iter()
            .filter(move |drum| self.is_hit(*drum, step))
    }
}

/// Build a lane from a string of `x` (hit) and `.` (rest).
///
/// Characters beyond sixteen are ignored; anything but `x`/`X` is a rest.
pub fn lane(pattern: &str) -> Lane {
    let mut lane = [false; STEPS];
    for (slot, c) in lane.iter_mut().zip(pattern.chars().filter(|c| !c.is_whitespace())) {
        *slot = matches!(c, 'x' | 'X');
    }
    lane
}
