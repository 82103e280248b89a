use crate::EngineContext;

/*
ADR Envelope Implementation
===========================

An Attack/Decay/Release contour with exponential segments. There is no sustain
plateau: once the attack has run its course the level decays towards silence
whether the gate is still held or not. That is the classic drum-machine and
acid-bass contour.

Vocabulary
----------

  rate        Inverse-time parameter in Hz. Larger rate = faster segment.
              The attack lasts `sample_rate / attack_rate` samples.

  level       Target the attack heads for (velocity-scaled peak).

  out         Current output value. Every sample it is smoothed towards the
              segment's input by a one-pole lowpass.


The Shape: One-Pole Segments
----------------------------

Each stage feeds a constant into the same one-pole smoother:

    out = a0 * in + b1 * out        a0 = 1 - x,  b1 = x,
                                    x  = exp(-2π · rate / sample_rate)

  Level
   level ┐   ╭──╮
         │  ╱    ╲__
         │ ╱        ╲___   (decay: in = 0)
     0.0 └╱─────────────────────────→ Time
          Attack  Decay      Release (in = 0, release rate)

During attack `in = level`; afterwards `in = 0`. The smoother makes every
segment exponential, which is how most analog contours behave.


The State Machine
-----------------

    Off ──attack()──→ Attack ──(attack samples elapsed)──→ Decay
     ↑                  │                                    │
     │              release()                            release()
     │                  ↓                                    ↓
     └──(out < 1e-38)── Release ←────────────────────────────┘
     └──(out < 1e-38)── Decay

The OFF transition fires once the output underflows 1e-38. Below that the
level is inaudible and further recursion only risks subnormal slowdowns.
*/

/// Output floor below which a decaying envelope switches off.
pub const ENVELOPE_FLOOR: f64 = 1e-38;

const MIN_RATE: f64 = 0.01;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Off,     // Silent, output forced to 0
    Attack,  // Smoothing towards `level` for the attack length
    Decay,   // Smoothing towards 0 at the decay rate
    Release, // Gate dropped, smoothing towards 0 at the release rate
}

pub struct Envelope {
    ctx: EngineContext,

    // Shape parameters (inverse-time rates in Hz)
    attack_rate: f64,
    decay_rate: f64,
    release_rate: f64,
    level: f64,

    // Runtime state
    stage: EnvelopeStage,
    out: f64,
    position: usize,
    attack_samples: usize,
    a0: f64,
    b1: f64,
}

impl Envelope {
    pub fn new(ctx: &EngineContext) -> Self {
        Self::adr(ctx, 200.0, 8.0, 20.0)
    }

    pub fn adr(ctx: &EngineContext, attack: f64, decay: f64, release: f64) -> Self {
        let mut env = Self {
            ctx: *ctx,
            attack_rate: MIN_RATE,
            decay_rate: MIN_RATE,
            release_rate: MIN_RATE,
            level: 1.0,
            stage: EnvelopeStage::Off,
            out: 0.0,
            position: 0,
            attack_samples: 1,
            a0: 0.0,
            b1: 0.0,
        };
        env.set_attack(attack);
        env.set_decay(decay);
        env.set_release(release);
        env
    }

    fn coefficients(&mut self, rate: f64) {
        let x = self.ctx.pole(rate.clamp(MIN_RATE, self.ctx.nyquist() * 0.99));
        self.a0 = 1.0 - x;
        self.b1 = x;
    }

    pub fn set_attack(&mut self, rate: f64) {
        self.attack_rate = rate.max(MIN_RATE);
    }

    pub fn set_decay(&mut self, rate: f64) {
        self.decay_rate = rate.max(MIN_RATE);
        if self.stage == EnvelopeStage::Decay {
            self.coefficients(self.decay_rate);
        }
    }

    pub fn set_release(&mut self, rate: f64) {
        self.release_rate = rate.max(MIN_RATE);
        if self.stage == EnvelopeStage::Release {
            self.coefficients(self.release_rate);
        }
    }

    /// Peak the attack heads for, clamped to 0..=1.
    pub fn set_level(&mut self, level: f64) {
        self.level = level.clamp(0.0, 1.0);
    }

    /// Gate high: restart the attack from the current output.
    ///
    /// Starting from `out` rather than zero keeps retriggers click-free.
    pub fn attack(&mut self) {
        self.position = 0;
        self.attack_samples = self.ctx.samples_for_rate(self.attack_rate);
        self.coefficients(self.attack_rate);
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: decay from wherever we are at the release rate.
    pub fn release(&mut self) {
        if self.stage == EnvelopeStage::Off {
            return;
        }
        self.coefficients(self.release_rate);
        self.stage = EnvelopeStage::Release;
    }

    /// Advance the envelope by one sample and return the new output.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        let input = match self.stage {
            EnvelopeStage::Off => return 0.0,
            EnvelopeStage::Attack => {
                self.position += 1;
                if self.position >= self.attack_samples {
                    self.coefficients(self.decay_rate);
                    self.stage = EnvelopeStage::Decay;
                }
                self.level
            }
            EnvelopeStage::Decay | EnvelopeStage::Release => 0.0,
        };

        self.out = self.a0 * input + self.b1 * self.out;

        if self.stage != EnvelopeStage::Attack && self.out < ENVELOPE_FLOOR {
            self.out = 0.0;
            self.stage = EnvelopeStage::Off;
        }

        self.out
    }

    /// Returns true if the envelope is producing output.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Off
    }

    /// Silence immediately.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Off;
        self.out = 0.0;
        self.position = 0;
    }

    pub fn level(&self) -> f64 {
        self.out
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn attack_samples(&self) -> usize {
        self.attack_samples
    }
}
