use crate::sequencing::clock::{StepClock, StepEvent};
use crate::sequencing::pattern::{BasslinePattern, RhythmPattern};
use crate::synth::Instrument;
use crate::{EngineContext, SynthError, SynthResult};

/// Velocity for unaccented steps.
pub const NORMAL_VELOCITY: u8 = 100;
/// Velocity for accented steps. Voices treat anything from 128 up as accent.
pub const ACCENT_VELOCITY: u8 = 230;

fn velocity(accent: bool) -> u8 {
    if accent {
        ACCENT_VELOCITY
    } else {
        NORMAL_VELOCITY
    }
}

/// Plays a [`BasslinePattern`] on a monophonic instrument.
///
/// A step flagged `slide` keeps its note held through the off half, so the
/// next step's note-on arrives with the gate still open and the voice glides.
pub struct BasslineSequencer {
    clock: StepClock,
    pattern: BasslinePattern,
    playing: Option<u8>,
}

impl BasslineSequencer {
    pub fn new(ctx: &EngineContext, bpm: f64, pattern: BasslinePattern) -> SynthResult<Self> {
        Ok(Self {
            clock: StepClock::new(ctx, bpm)?,
            pattern,
            playing: None,
        })
    }

    pub fn pattern(&self) -> &BasslinePattern {
        &self.pattern
    }

    /// Swap the pattern; the running step and any held note are kept.
    pub fn set_pattern(&mut self, pattern: BasslinePattern) {
        self.pattern = pattern;
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut StepClock {
        &mut self.clock
    }

    /// Note currently gated on the instrument.
    pub fn playing(&self) -> Option<u8> {
        self.playing
    }

    #[inline]
    pub fn tick(&mut self, instrument: &mut dyn Instrument) -> SynthResult<()> {
        match self.clock.tick() {
            Some(StepEvent::On(step)) => self.step_on(step, instrument),
            Some(StepEvent::Off(step)) => {
                self.step_off(step, instrument);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn step_on(&mut self, index: usize, instrument: &mut dyn Instrument) -> SynthResult<()> {
        let step = *self.pattern.step(index);
        if step.pause {
            return Ok(());
        }
        let pitch = self.pattern.pitch(index)?;
        instrument.note_on(pitch, velocity(step.accent))?;
        self.playing = Some(pitch);
        Ok(())
    }

    fn step_off(&mut self, index: usize, instrument: &mut dyn Instrument) {
        if self.pattern.step(index).slide {
            return;
        }
        if let Some(note) = self.playing.take() {
            instrument.note_off(note, 0);
        }
    }

    /// Forget the held note and restart from step 0.
    pub fn reset(&mut self) {
        self.playing = None;
        self.clock.reset();
    }
}

/// Plays a [`RhythmPattern`] on a drum instrument.
pub struct RhythmSequencer {
    clock: StepClock,
    pattern: RhythmPattern,
}

impl RhythmSequencer {
    pub fn new(ctx: &EngineContext, bpm: f64, pattern: RhythmPattern) -> SynthResult<Self> {
        Ok(Self {
            clock: StepClock::new(ctx, bpm)?,
            pattern,
        })
    }

    pub fn pattern(&self) -> &RhythmPattern {
        &self.pattern
    }

    pub fn set_pattern(&mut self, pattern: RhythmPattern) {
        self.pattern = pattern;
    }

    pub fn clock(&self) -> &StepClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut StepClock {
        &mut self.clock
    }

    #[inline]
    pub fn tick(&mut self, instrument: &mut dyn Instrument) -> SynthResult<()> {
        match self.clock.tick() {
            Some(StepEvent::On(step)) => {
                let vel = velocity(self.pattern.accents[step]);
                for drum in self.pattern.hits_at(step) {
                    instrument.note_on(drum.note(), vel)?;
                }
                Ok(())
            }
            Some(StepEvent::Off(step)) => {
                for drum in self.pattern.hits_at(step) {
                    instrument.note_off(drum.note(), 0);
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn reset(&mut self) {
        self.clock.reset();
    }
}

/// What drives a track's instrument.
pub enum Sequencer {
    Bassline(BasslineSequencer),
    Rhythm(RhythmSequencer),
    /// Driven only by external note messages.
    Manual,
}

impl Sequencer {
    #[inline]
    pub fn tick(&mut self, instrument: &mut dyn Instrument) -> SynthResult<()> {
        match self {
            Sequencer::Bassline(seq) => seq.tick(instrument),
            Sequencer::Rhythm(seq) => seq.tick(instrument),
            Sequencer::Manual => Ok(()),
        }
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        if let Some(clock) = self.clock_mut() {
            clock.set_bpm(bpm);
        }
    }

    pub fn clock(&self) -> Option<&StepClock> {
        match self {
            Sequencer::Bassline(seq) => Some(seq.clock()),
            Sequencer::Rhythm(seq) => Some(seq.clock()),
            Sequencer::Manual => None,
        }
    }

    fn clock_mut(&mut self) -> Option<&mut StepClock> {
        match self {
            Sequencer::Bassline(seq) => Some(seq.clock_mut()),
            Sequencer::Rhythm(seq) => Some(seq.clock_mut()),
            Sequencer::Manual => None,
        }
    }

    pub fn set_bassline(&mut self, pattern: BasslinePattern) -> SynthResult<()> {
        match self {
            Sequencer::Bassline(seq) => {
                seq.set_pattern(pattern);
                Ok(())
            }
            _ => Err(SynthError::configuration(
                "pattern",
                "track is not driven by a bassline sequencer",
            )),
        }
    }

    pub fn set_rhythm(&mut self, pattern: RhythmPattern) -> SynthResult<()> {
        match self {
            Sequencer::Rhythm(seq) => {
                seq.set_pattern(pattern);
                Ok(())
            }
            _ => Err(SynthError::configuration(
                "pattern",
                "track is not driven by a rhythm sequencer",
            )),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Sequencer::Bassline(seq) => seq.reset(),
            Sequencer::Rhythm(seq) => seq.reset(),
            Sequencer::Manual => {}
        }
    }
}
