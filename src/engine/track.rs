//! Track - one instrument and the sequencer that plays it.
//!
//! A track is the unit the mixer ticks once per sample. Event errors never
//! escape the hot path: the offending track's voice is silenced and the
//! rejection is counted.

use crate::sequencing::Sequencer;
use crate::synth::{EngineStats, Instrument, StereoFrame};
use crate::SynthResult;

pub struct Track {
    /// Display name
    pub name: String,
    sequencer: Sequencer,
    instrument: Box<dyn Instrument>,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        sequencer: Sequencer,
        instrument: impl Instrument + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            sequencer,
            instrument: Box::new(instrument),
        }
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    pub fn instrument(&self) -> &dyn Instrument {
        &*self.instrument
    }

    /// Advance the sequencer and render one frame.
    #[inline]
    pub fn tick(&mut self, stats: &EngineStats) -> StereoFrame {
        if self.sequencer.tick(&mut *self.instrument).is_err() {
            self.fault(stats);
        }
        self.instrument.next_frame()
    }

    /// Silence the voice after a rejected event.
    pub fn fault(&mut self, stats: &EngineStats) {
        self.instrument.all_notes_off();
        stats.record_rejected_event();
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> SynthResult<()> {
        self.instrument.note_on(note, velocity)
    }

    pub fn note_off(&mut self, note: u8, velocity: u8) {
        self.instrument.note_off(note, velocity)
    }

    pub fn control_change(&mut self, controller: u8, value: u8) -> SynthResult<()> {
        self.instrument.control_change(controller, value)
    }

    pub fn all_notes_off(&mut self) {
        self.instrument.all_notes_off();
    }

    /// Check if this track is currently producing sound
    pub fn is_active(&self) -> bool {
        self.instrument.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::{BasslinePattern, BasslineSequencer, Step};
    use crate::voices::AcidVoice;
    use crate::EngineContext;

    #[test]
    fn bad_pattern_pitch_mutes_and_counts() {
        let ctx = EngineContext::default();
        let mut pattern = BasslinePattern::new(120);
        pattern.steps[0] = Step::note(12).up();

        let seq = BasslineSequencer::new(&ctx, 120.0, pattern).unwrap();
        let mut track = Track::new("bass", Sequencer::Bassline(seq), AcidVoice::new(&ctx).unwrap());
        let stats = EngineStats::default();

        let frame = track.tick(&stats);
        assert_eq!(stats.rejected_events(), 1);
        assert_eq!(frame.left, 0.0);
        assert!(!track.is_active());
    }

    #[test]
    fn manual_track_plays_notes() {
        let ctx = EngineContext::default();
        let mut track = Track::new("bass", Sequencer::Manual, AcidVoice::new(&ctx).unwrap());
        let stats = EngineStats::default();

        track.note_on(45, 200).unwrap();
        let energy: f64 = (0..2000).map(|_| track.tick(&stats).left.powi(2)).sum();
        assert!(energy > 0.0);
        assert_eq!(stats.rejected_events(), 0);
    }
}
