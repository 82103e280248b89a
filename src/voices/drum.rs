/*
Drum Sounds
===========

Eight one-shot sounds, each addressed by its General MIDI drum note:

| sound       | note | sample | synth recipe                                     |
| ----------- | ---- | ------ | ------------------------------------------------ |
| bass drum   | 36   | bd     | sine, 150 Hz swept down to 50 Hz, short decay    |
| snare       | 38   | sd     | triangle body + high-passed noise                |
| closed hat  | 42   | ch     | high-passed noise, very short                    |
| open hat    | 46   | oh     | high-passed noise, longer; choked by closed hat  |
| clap        | 39   | cp     | band-passed noise with a soft attack             |
| low tom     | 45   | lt     | sine, 100 Hz swept down from higher up           |
| high tom    | 50   | ht     | sine, 160 Hz swept down from higher up           |
| crash       | 49   | cy     | high-passed noise, long decay                    |

A sound plays back a sample table when the bank holds one under its name,
otherwise it runs the synth recipe. Either way the result goes through a
tone (low-pass) filter and the amplitude envelope, then gets the sound's
fixed pan and send amounts.

Each sound exposes six controllers, numbered `index * 6 + param`:

  Tune    ±12 semitones (playback speed for samples)
  Attack  attack time, longer as the value rises
  Decay   decay time, longer as the value rises
  Volume  output level
  Tone    tone filter cutoff, 200 Hz up to the top of the band
  Snappy  noise share in the synth mix
*/

use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::{FilterMode, OnePole};
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::io::loader::SampleBank;
use crate::synth::instrument::{unit_from_cc, StereoFrame};
use crate::{EngineContext, SynthError, SynthResult};

/// Number of drum sounds in a rhythm voice.
pub const DRUM_COUNT: usize = 8;

/// Controllers per drum sound.
pub const PARAMS_PER_DRUM: usize = 6;

/// Release rate used when a sound is choked.
const CHOKE_RATE: f64 = 150.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumKind {
    BassDrum,
    SnareDrum,
    ClosedHat,
    OpenHat,
    Clap,
    LowTom,
    HighTom,
    Crash,
}

impl DrumKind {
    pub const ALL: [DrumKind; DRUM_COUNT] = [
        DrumKind::BassDrum,
        DrumKind::SnareDrum,
        DrumKind::ClosedHat,
        DrumKind::OpenHat,
        DrumKind::Clap,
        DrumKind::LowTom,
        DrumKind::HighTom,
        DrumKind::Crash,
    ];

    /// Notes with a sound, in [`DrumKind::ALL`] order.
    pub const NOTES: [u8; DRUM_COUNT] = {
        let mut notes = [0; DRUM_COUNT];
        let mut i = 0;
        while i < DRUM_COUNT {
            notes[i] = Self::ALL[i].note();
            i += 1;
        }
        notes
    };

    pub fn index(self) -> usize {
        self as usize
    }

    /// General MIDI drum note.
    pub const fn note(self) -> u8 {
        match self {
            DrumKind::BassDrum => 36,
            DrumKind::SnareDrum => 38,
            DrumKind::ClosedHat => 42,
            DrumKind::OpenHat => 46,
            DrumKind::Clap => 39,
            DrumKind::LowTom => 45,
            DrumKind::HighTom => 50,
            DrumKind::Crash => 49,
        }
    }

    pub fn from_note(note: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.note() == note)
    }

    /// Name of the sample this sound plays from a [`SampleBank`].
    pub fn sample_name(self) -> &'static str {
        match self {
            DrumKind::BassDrum => "bd",
            DrumKind::SnareDrum => "sd",
            DrumKind::ClosedHat => "ch",
            DrumKind::OpenHat => "oh",
            DrumKind::Clap => "cp",
            DrumKind::LowTom => "lt",
            DrumKind::HighTom => "ht",
            DrumKind::Crash => "cy",
        }
    }

    /// Pan position, -1 (left) to 1 (right).
    pub fn pan(self) -> f64 {
        match self {
            DrumKind::BassDrum | DrumKind::SnareDrum | DrumKind::Clap => 0.0,
            DrumKind::ClosedHat => 0.3,
            DrumKind::OpenHat => 0.35,
            DrumKind::LowTom => -0.4,
            DrumKind::HighTom => 0.4,
            DrumKind::Crash => -0.25,
        }
    }

    /// Fixed (delay, reverb) send amounts.
    pub fn sends(self) -> (f64, f64) {
        match self {
            DrumKind::BassDrum => (0.0, 0.05),
            DrumKind::SnareDrum => (0.1, 0.3),
            DrumKind::ClosedHat => (0.15, 0.1),
            DrumKind::OpenHat => (0.2, 0.15),
            DrumKind::Clap => (0.25, 0.4),
            DrumKind::LowTom | DrumKind::HighTom => (0.2, 0.25),
            DrumKind::Crash => (0.1, 0.3),
        }
    }

    fn recipe(self) -> Recipe {
        match self {
            DrumKind::BassDrum => Recipe {
                body: Waveform::Sine,
                freq: 50.0,
                sweep: 100.0,
                sweep_rate: 25.0,
                snappy: 0.0,
                noise: (FilterMode::LowPass, 2_000.0),
                attack: 2_000.0,
                decay: 6.0,
            },
            DrumKind::SnareDrum => Recipe {
                body: Waveform::Triangle,
                freq: 180.0,
                sweep: 60.0,
                sweep_rate: 40.0,
                snappy: 0.6,
                noise: (FilterMode::HighPass, 3_000.0),
                attack: 2_000.0,
                decay: 12.0,
            },
            DrumKind::ClosedHat => Recipe {
                body: Waveform::Square,
                freq: 540.0,
                sweep: 0.0,
                sweep_rate: 1.0,
                snappy: 0.9,
                noise: (FilterMode::HighPass, 7_000.0),
                attack: 2_000.0,
                decay: 30.0,
            },
            DrumKind::OpenHat => Recipe {
                body: Waveform::Square,
                freq: 540.0,
                sweep: 0.0,
                sweep_rate: 1.0,
                snappy: 0.9,
                noise: (FilterMode::HighPass, 7_000.0),
                attack: 2_000.0,
                decay: 5.0,
            },
            DrumKind::Clap => Recipe {
                body: Waveform::Sine,
                freq: 1_000.0,
                sweep: 0.0,
                sweep_rate: 1.0,
                snappy: 1.0,
                noise: (FilterMode::BandPass, 1_500.0),
                attack: 200.0,
                decay: 14.0,
            },
            DrumKind::LowTom => Recipe {
                body: Waveform::Sine,
                freq: 100.0,
                sweep: 120.0,
                sweep_rate: 20.0,
                snappy: 0.05,
                noise: (FilterMode::LowPass, 1_000.0),
                attack: 2_000.0,
                decay: 7.0,
            },
            DrumKind::HighTom => Recipe {
                body: Waveform::Sine,
                freq: 160.0,
                sweep: 200.0,
                sweep_rate: 20.0,
                snappy: 0.05,
                noise: (FilterMode::LowPass, 1_500.0),
                attack: 2_000.0,
                decay: 8.0,
            },
            DrumKind::Crash => Recipe {
                body: Waveform::Square,
                freq: 800.0,
                sweep: 0.0,
                sweep_rate: 1.0,
                snappy: 0.95,
                noise: (FilterMode::HighPass, 3_000.0),
                attack: 2_000.0,
                decay: 0.8,
            },
        }
    }
}

/// Per-sound controller, offset within the sound's block of six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DrumParam {
    Tune = 0,
    Attack = 1,
    Decay = 2,
    Volume = 3,
    Tone = 4,
    Snappy = 5,
}

impl DrumParam {
    pub const ALL: [DrumParam; PARAMS_PER_DRUM] = [
        DrumParam::Tune,
        DrumParam::Attack,
        DrumParam::Decay,
        DrumParam::Volume,
        DrumParam::Tone,
        DrumParam::Snappy,
    ];

    /// Controller number of this parameter on `drum`.
    pub fn controller(self, drum: DrumKind) -> u8 {
        (drum.index() * PARAMS_PER_DRUM + self as usize) as u8
    }

    /// Split a controller number into sound and parameter.
    pub fn decode(controller: u8) -> SynthResult<(DrumKind, DrumParam)> {
        let c = controller as usize;
        if c >= DRUM_COUNT * PARAMS_PER_DRUM {
            return Err(SynthError::out_of_range(
                "controller",
                controller as i64,
                0,
                (DRUM_COUNT * PARAMS_PER_DRUM) as i64 - 1,
            ));
        }
        Ok((
            DrumKind::ALL[c / PARAMS_PER_DRUM],
            DrumParam::ALL[c % PARAMS_PER_DRUM],
        ))
    }
}

/// Synth recipe for one sound.
#[derive(Debug, Clone, Copy)]
struct Recipe {
    body: Waveform,
    freq: f64,
    /// Extra Hz at the start of the hit, decaying away.
    sweep: f64,
    sweep_rate: f64,
    snappy: f64,
    noise: (FilterMode, f64),
    attack: f64,
    decay: f64,
}

enum Source {
    Sample {
        table: Arc<[f64]>,
        position: f64,
    },
    Synth {
        recipe: Recipe,
        body: Oscillator,
        noise: Oscillator,
        noise_filter: OnePole,
        pitch_env: Envelope,
    },
}

/// One drum sound: a sample or synth source, tone filter and envelope.
pub struct DrumSound {
    kind: DrumKind,
    source: Source,
    tone_filter: OnePole,
    amp_env: Envelope,
    tune: f64,
    volume: f64,
    tone: f64,
    snappy: f64,
    gain_left: f64,
    gain_right: f64,
    delay_send: f64,
    reverb_send: f64,
}

impl DrumSound {
    /// Synthesized sound.
    pub fn synth(ctx: &EngineContext, kind: DrumKind) -> SynthResult<Self> {
        let recipe = kind.recipe();
        let (mode, cutoff) = recipe.noise;
        let source = Source::Synth {
            recipe,
            body: Oscillator::new(ctx, recipe.body),
            noise: Oscillator::new(ctx, Waveform::Noise).with_seed(0xd0 + kind.index() as u64),
            noise_filter: OnePole::new(ctx, mode, cutoff)?,
            pitch_env: Envelope::adr(ctx, 4_000.0, recipe.sweep_rate, recipe.sweep_rate),
        };
        Self::build(ctx, kind, source, recipe)
    }

    /// Sample playback over a shared table.
    pub fn sample(ctx: &EngineContext, kind: DrumKind, table: Arc<[f64]>) -> SynthResult<Self> {
        if table.is_empty() {
            return Err(SynthError::configuration(
                "sample",
                format!("sample table for '{}' is empty", kind.sample_name()),
            ));
        }
        let position = table.len() as f64;
        let mut recipe = kind.recipe();
        // Samples carry their own decay; the envelope only trims it.
        recipe.decay = 0.3;
        Self::build(ctx, kind, Source::Sample { table, position }, recipe)
    }

    /// Sample from `bank` when it has one for this sound, otherwise synth.
    pub fn from_bank(
        ctx: &EngineContext,
        kind: DrumKind,
        bank: Option<&SampleBank>,
    ) -> SynthResult<Self> {
        match bank.and_then(|b| b.get(kind.sample_name())) {
            Some(table) => Self::sample(ctx, kind, table),
            None => Self::synth(ctx, kind),
        }
    }

    fn build(ctx: &EngineContext, kind: DrumKind, source: Source, recipe: Recipe) -> SynthResult<Self> {
        let angle = (kind.pan().clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        let (delay_send, reverb_send) = kind.sends();
        let mut sound = Self {
            kind,
            source,
            tone_filter: OnePole::lowpass(ctx, ctx.nyquist() * 0.9)?,
            amp_env: Envelope::adr(ctx, recipe.attack, recipe.decay, CHOKE_RATE),
            tune: 0.0,
            volume: 0.8,
            tone: 1.0,
            snappy: recipe.snappy,
            gain_left: angle.cos(),
            gain_right: angle.sin(),
            delay_send,
            reverb_send,
        };
        sound.set_tone(1.0);
        Ok(sound)
    }

    pub fn kind(&self) -> DrumKind {
        self.kind
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self.source, Source::Sample { .. })
    }

    pub fn is_active(&self) -> bool {
        self.amp_env.is_active()
    }

    fn set_tone(&mut self, tone: f64) {
        self.tone = tone.clamp(0.0, 1.0);
        self.tone_filter.set_cutoff(200.0 * 2.0_f64.powf(self.tone * 6.5));
    }

    /// Start the sound. Velocity spans 0..=255.
    pub fn trigger(&mut self, velocity: u8) {
        self.amp_env.set_level(velocity as f64 / 255.0);
        self.amp_env.attack();
        match &mut self.source {
            Source::Sample { position, .. } => *position = 0.0,
            Source::Synth { body, pitch_env, .. } => {
                body.reset();
                pitch_env.attack();
            }
        }
    }

    /// Cut the sound short.
    pub fn choke(&mut self) {
        self.amp_env.release();
    }

    pub fn reset(&mut self) {
        self.amp_env.reset();
        self.tone_filter.reset();
        match &mut self.source {
            Source::Sample { table, position } => *position = table.len() as f64,
            Source::Synth {
                noise_filter,
                pitch_env,
                ..
            } => {
                noise_filter.reset();
                pitch_env.reset();
            }
        }
    }

    pub fn set_param(&mut self, param: DrumParam, value: u8) {
        let u = unit_from_cc(value);
        match param {
            DrumParam::Tune => self.tune = (u - 0.5) * 24.0,
            DrumParam::Attack => self.amp_env.set_attack(2_000.0 * (1.0 - u) + 20.0),
            DrumParam::Decay => self.amp_env.set_decay(0.3 + 40.0 * (1.0 - u) * (1.0 - u)),
            DrumParam::Volume => self.volume = u,
            DrumParam::Tone => self.set_tone(u),
            DrumParam::Snappy => self.snappy = u,
        }
    }

    #[inline]
    pub fn tick(&mut self) -> StereoFrame {
        if !self.amp_env.is_active() {
            return StereoFrame::default();
        }

        let ratio = (self.tune / 12.0).exp2();
        let (raw, finished) = match &mut self.source {
            Source::Sample { table, position } => {
                let i = *position as usize;
                let s = if i + 1 < table.len() {
                    let t = *position - i as f64;
                    table[i] + (table[i + 1] - table[i]) * t
                } else if i < table.len() {
                    table[i]
                } else {
                    0.0
                };
                *position += ratio;
                (s, *position >= table.len() as f64)
            }
            Source::Synth {
                recipe,
                body,
                noise,
                noise_filter,
                pitch_env,
            } => {
                let sweep = recipe.sweep * pitch_env.tick();
                body.set_frequency((recipe.freq + sweep) * ratio);
                let b = body.tick();
                let n = noise_filter.process(noise.tick());
                (b * (1.0 - self.snappy) + n * self.snappy, false)
            }
        };

        let s = self.tone_filter.process(raw) * self.amp_env.tick() * self.volume;
        if finished {
            self.amp_env.reset();
        }
        StereoFrame {
            left: s * self.gain_left,
            right: s * self.gain_right,
            delay_send: s * self.delay_send,
            reverb_send: s * self.reverb_send,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(sound: &mut DrumSound, n: usize) -> Vec<StereoFrame> {
        (0..n).map(|_| sound.tick()).collect()
    }

    fn energy(block: &[StereoFrame]) -> f64 {
        block.iter().map(|o| o.left * o.left + o.right * o.right).sum()
    }

    #[test]
    fn notes_round_trip() {
        for kind in DrumKind::ALL {
            assert_eq!(DrumKind::from_note(kind.note()), Some(kind));
        }
        assert_eq!(DrumKind::from_note(60), None);
        assert_eq!(DrumKind::NOTES, DrumKind::ALL.map(DrumKind::note));
    }

    #[test]
    fn controller_numbers_decode() {
        let cc = DrumParam::Decay.controller(DrumKind::OpenHat);
        assert_eq!(cc, 3 * 6 + 2);
        assert_eq!(DrumParam::decode(cc).unwrap(), (DrumKind::OpenHat, DrumParam::Decay));
        assert!(DrumParam::decode(48).is_err());
    }

    #[test]
    fn every_synth_sound_makes_noise() {
        let ctx = EngineContext::default();
        for kind in DrumKind::ALL {
            let mut sound = DrumSound::synth(&ctx, kind).unwrap();
            assert!(energy(&render(&mut sound, 256)) == 0.0);
            sound.trigger(200);
            let block = render(&mut sound, 4410);
            assert!(energy(&block) > 1e-6, "{kind:?} is silent");
            assert!(block.iter().all(|o| o.left.is_finite() && o.right.is_finite()));
        }
    }

    #[test]
    fn pan_is_fixed_per_sound() {
        let ctx = EngineContext::default();
        let mut tom = DrumSound::synth(&ctx, DrumKind::LowTom).unwrap();
        tom.trigger(255);
        let block = render(&mut tom, 2000);
        let left: f64 = block.iter().map(|o| o.left.abs()).sum();
        let right: f64 = block.iter().map(|o| o.right.abs()).sum();
        assert!(left > right);
    }

    #[test]
    fn sample_plays_table_then_stops() {
        let ctx = EngineContext::default();
        let table: Arc<[f64]> = vec![0.5; 100].into();
        let mut sound = DrumSound::sample(&ctx, DrumKind::BassDrum, table).unwrap();
        assert!(sound.is_sampled());
        sound.trigger(255);
        let block = render(&mut sound, 100);
        assert!(block.iter().any(|o| o.left.abs() > 0.0));
        assert!(!sound.is_active());
        assert!(render(&mut sound, 300).iter().all(|o| *o == StereoFrame::default()));

        sound.trigger(255);
        assert!(sound.is_active());
    }

    #[test]
    fn empty_sample_is_rejected() {
        let ctx = EngineContext::default();
        let table: Arc<[f64]> = Vec::new().into();
        assert!(DrumSound::sample(&ctx, DrumKind::Clap, table).is_err());
    }

    #[test]
    fn shorter_decay_ends_sooner() {
        let ctx = EngineContext::default();
        let mut long = DrumSound::synth(&ctx, DrumKind::Crash).unwrap();
        let mut short = DrumSound::synth(&ctx, DrumKind::Crash).unwrap();
        long.set_param(DrumParam::Decay, 127);
        short.set_param(DrumParam::Decay, 0);
        long.trigger(200);
        short.trigger(200);
        let tail = |s: &mut DrumSound| energy(&render(s, 44_100)[22_050..]);
        assert!(tail(&mut long) > tail(&mut short));
    }

    #[test]
    fn choke_cuts_the_tail() {
        let ctx = EngineContext::default();
        let mut open = DrumSound::synth(&ctx, DrumKind::OpenHat).unwrap();
        let mut choked = DrumSound::synth(&ctx, DrumKind::OpenHat).unwrap();
        open.trigger(200);
        choked.trigger(200);
        render(&mut open, 1000);
        render(&mut choked, 1000);
        choked.choke();
        assert!(energy(&render(&mut choked, 4000)) < energy(&render(&mut open, 4000)) * 0.5);
    }
}
