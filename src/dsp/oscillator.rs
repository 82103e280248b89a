use std::f64::consts::TAU;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EngineContext, SynthError, SynthResult};

/*
Oscillators
===========

Both oscillators here are phase accumulators: a phase value in [0, 1) advances
by `increment = frequency / sample_rate` every sample and wraps at 1.0. The
waveform is whatever function of phase we read out.

  phase     0.0 ──────────────────────→ 1.0 (wraps)
  saw       -1 ╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱╱ +1
  square    +1 ‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_____________ -1

The simple `Oscillator` computes its waveform directly. That is fine for
percussion bodies and noise, but a naive saw aliases badly at high pitches.

The `WavetableOscillator` instead reads a stored single-cycle table. The tables
we generate are band-limited (summed harmonics up to a fixed count) and lookups
use 4-point Catmull-Rom interpolation between neighbouring table entries:

      p0      p1   x   p2      p3
       ●───────●───┼───●───────●
                 frac

  y = p1 + ½·t·(p2 - p0 + t·(2p0 - 5p1 + 4p2 - p3 + t·(3(p1 - p2) + p3 - p0)))

The window needs one sample before and two after the read position, so every
`CyclicTable` stores the period with three wrap-around copies: the last sample
in front, the first two behind. The window never leaves the allocation.
*/

const PADDING: usize = 3;

/// Waveforms of the simple periodic oscillator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

/// Phase-accumulating oscillator with directly computed waveforms.
pub struct Oscillator {
    waveform: Waveform,
    sample_rate: f64,
    phase: f64,
    increment: f64,
    rng: Pcg32,
}

impl Oscillator {
    pub fn new(ctx: &EngineContext, waveform: Waveform) -> Self {
        Self {
            waveform,
            sample_rate: ctx.sample_rate,
            phase: 0.0,
            increment: 0.0,
            rng: Pcg32::seed_from_u64(0x5eed),
        }
    }

    /// Reseed the noise source (only affects `Waveform::Noise`).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Phase increment becomes `hz / sample_rate`, limited to Nyquist.
    pub fn set_frequency(&mut self, hz: f64) {
        self.increment = (hz / self.sample_rate).clamp(0.0, 0.5);
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Return the sample at the current phase, then advance.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        let p = self.phase;
        let out = match self.waveform {
            Waveform::Sine => (TAU * p).sin(),
            Waveform::Saw => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (p - 0.5).abs() - 1.0,
            Waveform::Noise => self.rng.gen_range(-1.0..1.0),
        };

        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}

/// One period of a waveform, padded for cubic interpolation.
#[derive(Debug, Clone)]
pub struct CyclicTable {
    data: Arc<[f64]>,
    period: usize,
}

impl CyclicTable {
    /// Build a table from one period of samples.
    pub fn from_period(samples: &[f64]) -> SynthResult<Self> {
        if samples.is_empty() {
            return Err(SynthError::configuration(
                "wavetable",
                "a cyclic table needs at least one sample",
            ));
        }

        let n = samples.len();
        let mut data = Vec::with_capacity(n + PADDING);
        data.push(samples[n - 1]);
        data.extend_from_slice(samples);
        data.push(samples[0]);
        data.push(samples[1 % n]);

        Ok(Self {
            data: data.into(),
            period: n,
        })
    }

    /// Pure sine table.
    pub fn sine(len: usize) -> SynthResult<Self> {
        Self::additive(len, 1, |k| if k == 1 { 1.0 } else { 0.0 })
    }

    /// Band-limited sawtooth with `harmonics` partials.
    pub fn saw(len: usize, harmonics: usize) -> SynthResult<Self> {
        Self::additive(len, harmonics, |k| {
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            sign / k as f64
        })
    }

    /// Band-limited square with odd partials up to `harmonics`.
    pub fn square(len: usize, harmonics: usize) -> SynthResult<Self> {
        Self::additive(len, harmonics, |k| if k % 2 == 1 { 1.0 / k as f64 } else { 0.0 })
    }

    fn additive(len: usize, harmonics: usize, amplitude: impl Fn(usize) -> f64) -> SynthResult<Self> {
        if len < 4 {
            return Err(SynthError::configuration(
                "wavetable",
                format!("table length {len} is too short (minimum 4)"),
            ));
        }

        let mut samples: Vec<f64> = (0..len)
            .map(|i| {
                let t = i as f64 / len as f64;
                (1..=harmonics.max(1))
                    .map(|k| amplitude(k) * (TAU * k as f64 * t).sin())
                    .sum()
            })
            .collect();

        let peak = samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        if peak > 0.0 {
            for s in samples.iter_mut() {
                *s /= peak;
            }
        }

        Self::from_period(&samples)
    }

    /// Samples in one period (without padding).
    pub fn period(&self) -> usize {
        self.period
    }

    /// The unpadded period.
    pub fn samples(&self) -> &[f64] {
        &self.data[1..=self.period]
    }

    /// Catmull-Rom interpolation at `position` in `[0, period)`.
    #[inline]
    pub fn interpolate(&self, position: f64) -> f64 {
        let index = (position as usize).min(self.period - 1);
        let t = position - index as f64;

        // data[index + 1] is sample `index`; the window spans index-1..=index+2.
        let p0 = self.data[index];
        let p1 = self.data[index + 1];
        let p2 = self.data[index + 2];
        let p3 = self.data[index + 3];

        p1 + 0.5
            * t
            * (p2 - p0 + t * (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3 + t * (3.0 * (p1 - p2) + p3 - p0)))
    }
}

/// Oscillator reading a `CyclicTable` with cubic interpolation.
pub struct WavetableOscillator {
    table: CyclicTable,
    sample_rate: f64,
    phase: f64,
    increment: f64,
}

impl WavetableOscillator {
    pub fn new(ctx: &EngineContext, table: CyclicTable) -> Self {
        Self {
            table,
            sample_rate: ctx.sample_rate,
            phase: 0.0,
            increment: 0.0,
        }
    }

    /// Install a new periodic table. Cloning a table only bumps a refcount.
    pub fn set_sample(&mut self, table: CyclicTable) {
        self.table = table;
    }

    /// Restart the cycle from phase 0.
    pub fn trigger(&mut self) {
        self.phase = 0.0;
    }

    /// One table cycle per period of `hz`.
    pub fn set_frequency(&mut self, hz: f64) {
        self.increment = (hz / self.sample_rate).clamp(0.0, 0.5);
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    #[inline]
    pub fn tick(&mut self) -> f64 {
        let out = self
            .table
            .interpolate(self.phase * self.table.period() as f64);

        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}

/// Root-mean-square level of a block.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}
