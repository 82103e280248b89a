use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{EngineContext, SynthResult};

/*
| type          | constructed by                 | slope     |
| ------------- | ------------------------------ | --------- |
| low-pass      | OnePole / FourPole             | 6 / 24 dB |
| high-pass     | OnePole / FourPole             | 6 / 24 dB |
| band-pass     | hp - lp / 2×HP ∘ 2×LP (series) | 6 / 12 dB |
| DC blocker    | DcBlocker                      | 6 dB      |

All poles come from x = exp(-2π·cutoff/sample_rate), which lies in (0, 1) for
every cutoff in (0, sample_rate/2). Constructors reject cutoffs outside that
range; `set_cutoff` runs on the audio thread and clamps instead.
*/

/// Lowest cutoff a hot-path `set_cutoff` will accept.
pub const MIN_CUTOFF: f64 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutputs {
    pub lowpass: f64,
    pub highpass: f64,
    pub bandpass: f64,
}

#[inline]
fn clamp_cutoff(ctx: &EngineContext, cutoff: f64) -> f64 {
    if cutoff.is_nan() {
        return MIN_CUTOFF;
    }
    cutoff.clamp(MIN_CUTOFF, ctx.nyquist() * 0.98)
}

/// First-order section; low-pass and high-pass share one feedback memory.
#[derive(Debug, Clone)]
pub struct OnePole {
    ctx: EngineContext,
    mode: FilterMode,
    cutoff_hz: f64,
    a0: f64,
    b1: f64,
    tmp: f64,
}

impl OnePole {
    pub fn new(ctx: &EngineContext, mode: FilterMode, cutoff_hz: f64) -> SynthResult<Self> {
        let x = ctx.stable_pole("cutoff", cutoff_hz)?;
        Ok(Self {
            ctx: *ctx,
            mode,
            cutoff_hz,
            a0: 1.0 - x,
            b1: -x,
            tmp: 0.0,
        })
    }

    pub fn lowpass(ctx: &EngineContext, cutoff_hz: f64) -> SynthResult<Self> {
        Self::new(ctx, FilterMode::LowPass, cutoff_hz)
    }

    pub fn highpass(ctx: &EngineContext, cutoff_hz: f64) -> SynthResult<Self> {
        Self::new(ctx, FilterMode::HighPass, cutoff_hz)
    }

    pub fn bandpass(ctx: &EngineContext, cutoff_hz: f64) -> SynthResult<Self> {
        Self::new(ctx, FilterMode::BandPass, cutoff_hz)
    }

    /// Retune without failing; the cutoff is clamped into the stable range.
    #[inline]
    pub fn set_cutoff(&mut self, cutoff_hz: f64) {
        self.cutoff_hz = clamp_cutoff(&self.ctx, cutoff_hz);
        let x = self.ctx.pole(self.cutoff_hz);
        self.a0 = 1.0 - x;
        self.b1 = -x;
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff_hz
    }

    /// Feedback pole `x` (stored negated as `b1`).
    pub fn pole(&self) -> f64 {
        -self.b1
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn process_all(&mut self, input: f64) -> FilterOutputs {
        self.tmp = self.a0 * input - self.b1 * self.tmp;

        let lowpass = self.tmp;
        let highpass = input - self.tmp;
        FilterOutputs {
            lowpass,
            highpass,
            bandpass: highpass - lowpass,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let out = self.process_all(input);
        match self.mode {
            FilterMode::LowPass => out.lowpass,
            FilterMode::HighPass => out.highpass,
            FilterMode::BandPass => out.bandpass,
        }
    }

    pub fn reset(&mut self) {
        self.tmp = 0.0;
    }
}

/// Four cascaded one-pole stages (24 dB/oct), with optional resonance.
///
/// A rough ladder approximation: the last stage is fed back to the input
/// through `tanh`, which keeps the loop bounded at any resonance.
#[derive(Debug, Clone)]
pub struct FourPole {
    stages: [OnePole; 4],
    mode: FilterMode,
    resonance: f64,
    feedback: f64,
}

impl FourPole {
    pub fn new(ctx: &EngineContext, mode: FilterMode, cutoff_hz: f64) -> SynthResult<Self> {
        let stage = OnePole::new(ctx, FilterMode::LowPass, cutoff_hz)?;
        Ok(Self {
            stages: [stage.clone(), stage.clone(), stage.clone(), stage],
            mode,
            resonance: 0.0,
            feedback: 0.0,
        })
    }

    pub fn lowpass(ctx: &EngineContext, cutoff_hz: f64) -> SynthResult<Self> {
        Self::new(ctx, FilterMode::LowPass, cutoff_hz)
    }

    #[inline]
    pub fn set_cutoff(&mut self, cutoff_hz: f64) {
        for stage in &mut self.stages {
            stage.set_cutoff(cutoff_hz);
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.stages[0].cutoff()
    }

    /// Resonance 0..1 maps to a feedback gain of 0..3.6.
    pub fn set_resonance(&mut self, resonance: f64) {
        self.resonance = resonance.clamp(0.0, 1.0);
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut x = if self.resonance > 0.0 {
            (input - 3.6 * self.resonance * self.feedback).tanh()
        } else {
            input
        };

        for (i, stage) in self.stages.iter_mut().enumerate() {
            let out = stage.process_all(x);
            x = match self.mode {
                FilterMode::LowPass => out.lowpass,
                FilterMode::HighPass => out.highpass,
                FilterMode::BandPass if i < 2 => out.highpass,
                FilterMode::BandPass => out.lowpass,
            };
        }

        self.feedback = x;
        x
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.feedback = 0.0;
    }
}

/// DC-blocking high-pass.
///
/// Pole from the one-sided bilinear form
/// `p = 2 - cos w - sqrt((2 - cos w)^2 - 1)`, which keeps more low bass than
/// the plain one-pole pole at the same cutoff.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    ctx: EngineContext,
    pole: f64,
    x1: f64,
    y1: f64,
}

impl DcBlocker {
    pub fn new(ctx: &EngineContext, cutoff_hz: f64) -> SynthResult<Self> {
        ctx.stable_pole("dc_cutoff", cutoff_hz)?;
        Ok(Self {
            ctx: *ctx,
            pole: Self::compute_pole(ctx, cutoff_hz),
            x1: 0.0,
            y1: 0.0,
        })
    }

    fn compute_pole(ctx: &EngineContext, cutoff_hz: f64) -> f64 {
        let w = TAU * cutoff_hz / ctx.sample_rate;
        let k = 2.0 - w.cos();
        k - (k * k - 1.0).sqrt()
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f64) {
        self.pole = Self::compute_pole(&self.ctx, clamp_cutoff(&self.ctx, cutoff_hz));
    }

    pub fn pole(&self) -> f64 {
        self.pole
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let y = input - self.x1 + self.pole * self.y1;
        self.x1 = input;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
