use crate::error::ensure_range;
use crate::io::loader::SampleBank;
use crate::synth::instrument::{Instrument, StereoFrame};
use crate::voices::drum::{DrumKind, DrumParam, DrumSound};
use crate::{EngineContext, SynthError, SynthResult};

/// Drum machine: eight [`DrumSound`]s behind one instrument.
///
/// Notes select the sound by General MIDI drum number. Sounds are one-shots,
/// so note-off is ignored. A closed hat chokes a ringing open hat.
pub struct RhythmVoice {
    sounds: Vec<DrumSound>,
}

impl RhythmVoice {
    /// All sounds synthesized.
    pub fn new(ctx: &EngineContext) -> SynthResult<Self> {
        Self::with_bank(ctx, None)
    }

    /// Sounds with a sample in `bank` play it; the rest are synthesized.
    pub fn with_bank(ctx: &EngineContext, bank: Option<&SampleBank>) -> SynthResult<Self> {
        let sounds = DrumKind::ALL
            .into_iter()
            .map(|kind| DrumSound::from_bank(ctx, kind, bank))
            .collect::<SynthResult<Vec<_>>>()?;
        Ok(Self { sounds })
    }

    pub fn sound(&self, kind: DrumKind) -> &DrumSound {
        &self.sounds[kind.index()]
    }

    fn sound_mut(&mut self, kind: DrumKind) -> &mut DrumSound {
        &mut self.sounds[kind.index()]
    }
}

impl Instrument for RhythmVoice {
    fn note_on(&mut self, note: u8, velocity: u8) -> SynthResult<()> {
        ensure_range("note", note as i64, 0, 127)?;
        let kind = DrumKind::from_note(note).ok_or(SynthError::UnmappedNote {
            note,
            accepted: &DrumKind::NOTES,
        })?;

        if kind == DrumKind::ClosedHat {
            self.sound_mut(DrumKind::OpenHat).choke();
        }
        self.sound_mut(kind).trigger(velocity);
        Ok(())
    }

    fn note_off(&mut self, _note: u8, _velocity: u8) {}

    fn control_change(&mut self, controller: u8, value: u8) -> SynthResult<()> {
        let (kind, param) = DrumParam::decode(controller)?;
        ensure_range("value", value as i64, 0, 127)?;
        self.sound_mut(kind).set_param(param, value);
        Ok(())
    }

    #[inline]
    fn next_frame(&mut self) -> StereoFrame {
        let mut frame = StereoFrame::default();
        for sound in &mut self.sounds {
            frame += sound.tick();
        }
        frame
    }

    fn is_active(&self) -> bool {
        self.sounds.iter().any(DrumSound::is_active)
    }

    fn all_notes_off(&mut self) {
        for sound in &mut self.sounds {
            sound.reset();
        }
    }
}
