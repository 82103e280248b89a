//! Acid bassline voice.
//!
//! A monophonic bass in the 303 mould:
//!
//! 1. Band-limited saw or square wavetable
//! 2. Four-pole resonant low-pass, swept by its own envelope
//! 3. Waveshaping distortion
//! 4. DC blocker (the shaper is asymmetric under resonance)
//! 5. Amplitude envelope
//!
//! Accented notes (velocity from [`ACCENT_THRESHOLD`] up) play louder and
//! open the filter further. A note-on that arrives while the gate is still
//! open glides to the new pitch without retriggering either envelope; the
//! bassline sequencer produces exactly that on slid steps.

use crate::context::midi_note_to_freq;
use crate::dsp::distortion::Distortion;
use crate::dsp::envelope::Envelope;
use crate::dsp::filter::{DcBlocker, FourPole};
use crate::dsp::oscillator::{CyclicTable, WavetableOscillator};
use crate::error::ensure_range;
use crate::synth::instrument::{unit_from_cc, Instrument, StereoFrame};
use crate::{EngineContext, SynthError, SynthResult};

/// Velocities at or above this count as accented.
pub const ACCENT_THRESHOLD: u8 = 128;

const TABLE_LEN: usize = 2048;
const TABLE_HARMONICS: usize = 64;

/// Octaves the filter envelope can add on top of the base cutoff.
const ENV_MOD_OCTAVES: f64 = 4.0;

/// Controller numbers understood by [`AcidVoice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AcidControl {
    Tune = 0,
    Cutoff = 1,
    Resonance = 2,
    EnvMod = 3,
    Decay = 4,
    Accent = 5,
    Waveform = 6,
    Distortion = 7,
    Volume = 8,
    SlideTime = 9,
    DelaySend = 10,
    ReverbSend = 11,
}

impl AcidControl {
    pub const ALL: [AcidControl; 12] = [
        AcidControl::Tune,
        AcidControl::Cutoff,
        AcidControl::Resonance,
        AcidControl::EnvMod,
        AcidControl::Decay,
        AcidControl::Accent,
        AcidControl::Waveform,
        AcidControl::Distortion,
        AcidControl::Volume,
        AcidControl::SlideTime,
        AcidControl::DelaySend,
        AcidControl::ReverbSend,
    ];

    pub fn from_controller(controller: u8) -> SynthResult<Self> {
        Self::ALL
            .get(controller as usize)
            .copied()
            .ok_or_else(|| {
                SynthError::out_of_range("controller", controller as i64, 0, Self::ALL.len() as i64 - 1)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcidWaveform {
    Saw,
    Square,
}

pub struct AcidVoice {
    ctx: EngineContext,
    osc: WavetableOscillator,
    saw: CyclicTable,
    square: CyclicTable,
    waveform: AcidWaveform,
    filter: FourPole,
    filter_env: Envelope,
    amp_env: Envelope,
    distortion: Distortion,
    dc: DcBlocker,

    // Knobs
    tune: f64,
    cutoff: f64,
    env_mod: f64,
    accent_amount: f64,
    volume: f64,
    slide_time: f64,
    delay_send: f64,
    reverb_send: f64,

    // Note state
    note: Option<u8>,
    gate: bool,
    accent: bool,
    frequency: f64,
    target: f64,
    glide: f64,
}

impl AcidVoice {
    /// Build with additive saw and square tables.
    pub fn new(ctx: &EngineContext) -> SynthResult<Self> {
        let saw = CyclicTable::saw(TABLE_LEN, TABLE_HARMONICS)?;
        let square = CyclicTable::square(TABLE_LEN, TABLE_HARMONICS)?;
        Self::with_tables(ctx, saw, square)
    }

    /// Build over externally supplied (e.g. loaded) cycle tables.
    pub fn with_tables(
        ctx: &EngineContext,
        saw: CyclicTable,
        square: CyclicTable,
    ) -> SynthResult<Self> {
        let mut filter = FourPole::lowpass(ctx, 500.0)?;
        filter.set_resonance(0.6);

        let mut voice = Self {
            ctx: *ctx,
            osc: WavetableOscillator::new(ctx, saw.clone()),
            saw,
            square,
            waveform: AcidWaveform::Saw,
            filter,
            filter_env: Envelope::adr(ctx, 1000.0, 4.0, 30.0),
            amp_env: Envelope::adr(ctx, 500.0, 1.5, 60.0),
            distortion: Distortion::new(0.5),
            dc: DcBlocker::new(ctx, 10.0)?,
            tune: 0.0,
            cutoff: 500.0,
            env_mod: 0.5,
            accent_amount: 0.5,
            volume: 0.8,
            slide_time: 0.06,
            delay_send: 0.0,
            reverb_send: 0.1,
            note: None,
            gate: false,
            accent: false,
            frequency: 0.0,
            target: 0.0,
            glide: 0.0,
        };
        voice.set_slide_time(voice.slide_time);
        Ok(voice)
    }

    pub fn set_waveform(&mut self, waveform: AcidWaveform) {
        self.waveform = waveform;
        let table = match waveform {
            AcidWaveform::Saw => self.saw.clone(),
            AcidWaveform::Square => self.square.clone(),
        };
        self.osc.set_sample(table);
    }

    pub fn waveform(&self) -> AcidWaveform {
        self.waveform
    }

    /// Glide time constant in seconds.
    pub fn set_slide_time(&mut self, seconds: f64) {
        self.slide_time = seconds.clamp(0.001, 1.0);
        self.glide = 1.0 - (-1.0 / (self.slide_time * self.ctx.sample_rate)).exp();
    }

    /// Base cutoff in Hz, before the envelope sweep.
    pub fn set_cutoff(&mut self, hz: f64) {
        self.cutoff = hz.clamp(30.0, 5_000.0);
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn set_resonance(&mut self, resonance: f64) {
        self.filter.set_resonance(resonance);
    }

    /// Current (possibly gliding) oscillator frequency.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn is_gated(&self) -> bool {
        self.gate
    }

    pub fn is_accented(&self) -> bool {
        self.accent
    }

    fn pitch(&self, note: u8) -> f64 {
        midi_note_to_freq(note) * 2.0_f64.powf(self.tune / 12.0)
    }

    fn apply(&mut self, control: AcidControl, value: u8) {
        let u = unit_from_cc(value);
        match control {
            AcidControl::Tune => self.tune = (u - 0.5) * 24.0,
            AcidControl::Cutoff => self.set_cutoff(30.0 * (5_000.0_f64 / 30.0).powf(u)),
            AcidControl::Resonance => self.set_resonance(u * 0.95),
            AcidControl::EnvMod => self.env_mod = u,
            AcidControl::Decay => self.filter_env.set_decay(0.5 + 30.0 * (1.0 - u) * (1.0 - u)),
            AcidControl::Accent => self.accent_amount = u,
            AcidControl::Waveform => self.set_waveform(if value < 64 {
                AcidWaveform::Saw
            } else {
                AcidWaveform::Square
            }),
            AcidControl::Distortion => self.distortion.set_ratio(1.0 - 0.95 * u),
            AcidControl::Volume => self.volume = u,
            AcidControl::SlideTime => self.set_slide_time(0.005 + 0.5 * u * u),
            AcidControl::DelaySend => self.delay_send = u,
            AcidControl::ReverbSend => self.reverb_send = u,
        }
    }
}

impl Instrument for AcidVoice {
    fn note_on(&mut self, note: u8, velocity: u8) -> SynthResult<()> {
        ensure_range("note", note as i64, 0, 127)?;

        self.target = self.pitch(note);
        self.accent = velocity >= ACCENT_THRESHOLD;

        let boost = if self.accent { self.accent_amount } else { 0.0 };
        self.amp_env.set_level((0.65 + 0.35 * boost) * (0.5 + velocity as f64 / 510.0));

        if self.gate && self.note.is_some() {
            // Slide: keep the envelopes running.
            self.note = Some(note);
            return Ok(());
        }

        self.frequency = self.target;
        self.note = Some(note);
        self.gate = true;
        self.amp_env.attack();
        self.filter_env.attack();
        Ok(())
    }

    fn note_off(&mut self, note: u8, _velocity: u8) {
        if self.note != Some(note) {
            return;
        }
        self.gate = false;
        self.amp_env.release();
        self.filter_env.release();
    }

    fn control_change(&mut self, controller: u8, value: u8) -> SynthResult<()> {
        let control = AcidControl::from_controller(controller)?;
        ensure_range("value", value as i64, 0, 127)?;
        self.apply(control, value);
        Ok(())
    }

    #[inline]
    fn next_frame(&mut self) -> StereoFrame {
        self.frequency += (self.target - self.frequency) * self.glide;
        self.osc.set_frequency(self.frequency);
        let raw = self.osc.tick();

        let depth = self.env_mod * if self.accent { 1.0 + self.accent_amount } else { 1.0 };
        let sweep = self.filter_env.tick() * depth * ENV_MOD_OCTAVES;
        self.filter.set_cutoff(self.cutoff * sweep.exp2());

        let shaped = self.distortion.distort(self.filter.process(raw));
        let out = self.dc.process(shaped) * self.amp_env.tick() * self.volume;

        StereoFrame::mono(out, self.delay_send, self.reverb_send)
    }

    fn is_active(&self) -> bool {
        self.amp_env.is_active()
    }

    fn all_notes_off(&mut self) {
        self.note = None;
        self.gate = false;
        self.accent = false;
        self.amp_env.reset();
        self.filter_env.reset();
        self.filter.reset();
        self.distortion.reset();
        self.dc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice() -> AcidVoice {
        AcidVoice::new(&EngineContext::default()).unwrap()
    }

    fn render(v: &mut AcidVoice, n: usize) -> Vec<f64> {
        (0..n).map(|_| v.next_frame().left).collect()
    }

    fn peak(block: &[f64]) -> f64 {
        block.iter().fold(0.0_f64, |m, s| m.max(s.abs()))
    }

    #[test]
    fn silent_until_triggered() {
        let mut v = voice();
        assert!(render(&mut v, 512).iter().all(|s| *s == 0.0));
        assert!(!v.is_active());
    }

    #[test]
    fn note_sets_pitch() {
        let mut v = voice();
        v.note_on(69, 100).unwrap();
        assert!((v.frequency() - 440.0).abs() < 1e-9);
        let block = render(&mut v, 4096);
        assert!(peak(&block) > 0.01);
        assert!(block.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn gated_note_on_glides() {
        let mut v = voice();
        v.note_on(36, 100).unwrap();
        render(&mut v, 256);
        v.note_on(48, 100).unwrap();

        // Still near the old pitch, heading up.
        let start = v.frequency();
        assert!((start - midi_note_to_freq(36)).abs() < 1.0);
        render(&mut v, 44_100 / 2);
        assert!((v.frequency() - midi_note_to_freq(48)).abs() < 0.5);
        assert_eq!(v.note(), Some(48));
    }

    #[test]
    fn released_note_retriggers() {
        let mut v = voice();
        v.note_on(36, 100).unwrap();
        v.note_off(36, 0);
        assert!(!v.is_gated());
        v.note_on(48, 100).unwrap();
        assert!((v.frequency() - midi_note_to_freq(48)).abs() < 1e-9);
    }

    #[test]
    fn stale_note_off_is_ignored() {
        let mut v = voice();
        v.note_on(36, 100).unwrap();
        v.note_on(40, 100).unwrap();
        v.note_off(36, 0);
        assert!(v.is_gated());
    }

    #[test]
    fn accent_follows_velocity() {
        let mut v = voice();
        v.note_on(36, ACCENT_THRESHOLD - 1).unwrap();
        assert!(!v.is_accented());
        v.note_off(36, 0);
        v.note_on(36, ACCENT_THRESHOLD).unwrap();
        assert!(v.is_accented());
    }

    #[test]
    fn accent_is_louder() {
        let mut soft = voice();
        let mut loud = voice();
        soft.control_change(AcidControl::Accent as u8, 127).unwrap();
        loud.control_change(AcidControl::Accent as u8, 127).unwrap();
        soft.note_on(45, 100).unwrap();
        loud.note_on(45, 230).unwrap();
        assert!(peak(&render(&mut loud, 4096)) > peak(&render(&mut soft, 4096)));
    }

    #[test]
    fn invalid_events_are_rejected() {
        let mut v = voice();
        assert!(v.note_on(128, 100).is_err());
        assert!(v.note().is_none());
        assert!(v.control_change(200, 10).is_err());
        assert!(v.control_change(AcidControl::Cutoff as u8, 128).is_err());
        assert_eq!(v.cutoff(), 500.0);
    }

    #[test]
    fn waveform_controller_switches_table() {
        let mut v = voice();
        v.control_change(AcidControl::Waveform as u8, 127).unwrap();
        assert_eq!(v.waveform(), AcidWaveform::Square);
        v.control_change(AcidControl::Waveform as u8, 0).unwrap();
        assert_eq!(v.waveform(), AcidWaveform::Saw);
    }

    #[test]
    fn all_notes_off_silences() {
        let mut v = voice();
        v.note_on(40, 200).unwrap();
        render(&mut v, 1000);
        v.all_notes_off();
        assert!(!v.is_active());
        assert!(render(&mut v, 64).iter().all(|s| s.abs() < 1e-9));
    }
}
