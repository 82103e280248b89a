use std::f64::consts::TAU;

use crate::{SynthError, SynthResult, SAMPLE_RATE};

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// Context handed to every DSP unit at construction.
///
/// Holds what used to be process-wide state. Coefficients are derived from
/// `sample_rate` once; a different rate means building new units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineContext {
    pub sample_rate: f64,
}

impl EngineContext {
    pub fn new(sample_rate: f64) -> SynthResult<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::configuration(
                "sample_rate",
                format!("must be positive and finite, got {sample_rate}"),
            ));
        }
        Ok(Self { sample_rate })
    }

    /// Highest frequency representable at this rate.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate * 0.5
    }

    /// Pole of a one-pole section: `exp(-2π·freq/sample_rate)`.
    ///
    /// Unchecked; callers on the hot path clamp `freq` themselves.
    #[inline]
    pub fn pole(&self, freq: f64) -> f64 {
        (-TAU * freq / self.sample_rate).exp()
    }

    /// Pole for a cutoff that must keep the section stable (`0 < x < 1`).
    pub fn stable_pole(&self, name: &'static str, freq: f64) -> SynthResult<f64> {
        if !freq.is_finite() || freq <= 0.0 || freq >= self.nyquist() {
            return Err(SynthError::configuration(
                name,
                format!(
                    "{freq} Hz is outside (0, {}) at {} Hz",
                    self.nyquist(),
                    self.sample_rate
                ),
            ));
        }
        let x = self.pole(freq);
        if x <= 0.0 || x >= 1.0 {
            return Err(SynthError::configuration(
                name,
                format!("pole {x} is not inside (0, 1)"),
            ));
        }
        Ok(x)
    }

    /// Number of samples in one period of `rate` Hz (at least one).
    pub fn samples_for_rate(&self, rate: f64) -> usize {
        (self.sample_rate / rate.max(f64::MIN_POSITIVE)).max(1.0) as usize
    }

    /// Scales a delay length tuned at 44.1 kHz to this rate.
    pub fn scale_tuning(&self, samples_at_44k1: usize) -> usize {
        ((samples_at_44k1 as f64 * self.sample_rate / SAMPLE_RATE).round() as usize).max(1)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
        }
    }
}
