use crate::sequencing::pattern::STEPS;
use crate::{EngineContext, SynthError, SynthResult};

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;

/// Half-step boundary reported by [`StepClock::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// First half of a step: start the note.
    On(usize),
    /// Second half of a step: release the note (unless tied).
    Off(usize),
}

/// Sample counter that splits each sixteenth step into an on and an off half.
///
/// The clock is ticked once per sample. Every `samples_per_step` ticks it
/// toggles between halves; after an off half the step index advances,
/// wrapping at the pattern length and counting completed bars.
#[derive(Debug, Clone)]
pub struct StepClock {
    sample_rate: f64,
    bpm: f64,
    samples_per_step: usize,
    counter: usize,
    half: usize,
    step: usize,
    bars: u64,
}

impl StepClock {
    pub fn new(ctx: &EngineContext, bpm: f64) -> SynthResult<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SynthError::configuration(
                "bpm",
                format!("tempo must be positive, got {bpm}"),
            ));
        }
        let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        Ok(Self {
            sample_rate: ctx.sample_rate,
            bpm,
            samples_per_step: samples_per_step(ctx.sample_rate, bpm),
            counter: 0,
            half: 0,
            step: 0,
            bars: 0,
        })
    }

    /// Clamped to 20..=300; NaN is ignored. Takes effect from the next half-step.
    pub fn set_bpm(&mut self, bpm: f64) {
        if bpm.is_nan() {
            return;
        }
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        self.samples_per_step = samples_per_step(self.sample_rate, self.bpm);
        if self.counter >= self.samples_per_step {
            self.counter = 0;
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Length of one half-step in samples.
    pub fn samples_per_step(&self) -> usize {
        self.samples_per_step
    }

    /// Index of the step currently playing.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Completed passes through the pattern.
    pub fn bars(&self) -> u64 {
        self.bars
    }

    /// Advance one sample.
    #[inline]
    pub fn tick(&mut self) -> Option<StepEvent> {
        let event = if self.counter == 0 {
            Some(self.fire())
        } else {
            None
        };

        self.counter += 1;
        if self.counter >= self.samples_per_step {
            self.counter = 0;
        }
        event
    }

    fn fire(&mut self) -> StepEvent {
        let step = self.step;
        let event = if self.half == 0 {
            StepEvent::On(step)
        } else {
            self.step += 1;
            if self.step >= STEPS {
                self.step = 0;
                self.bars += 1;
            }
            StepEvent::Off(step)
        };
        self.half ^= 1;
        event
    }

    /// Return to the first sample of step 0.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.half = 0;
        self.step = 0;
        self.bars = 0;
    }
}

fn samples_per_step(sample_rate: f64, bpm: f64) -> usize {
    ((sample_rate / (bpm / 60.0) / 8.0).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(bpm: f64) -> StepClock {
        StepClock::new(&EngineContext::default(), bpm).unwrap()
    }

    #[test]
    fn half_step_length_at_120_bpm() {
        assert_eq!(clock(120.0).samples_per_step(), 2756);
    }

    #[test]
    fn first_tick_fires_note_on() {
        let mut c = clock(120.0);
        assert_eq!(c.tick(), Some(StepEvent::On(0)));
        assert_eq!(c.tick(), None);
    }

    #[test]
    fn halves_alternate_and_step_advances_after_off() {
        let mut c = clock(120.0);
        let sps = c.samples_per_step();
        let events: Vec<_> = (0..sps * 4).filter_map(|_| c.tick()).collect();
        assert_eq!(
            events,
            vec![
                StepEvent::On(0),
                StepEvent::Off(0),
                StepEvent::On(1),
                StepEvent::Off(1)
            ]
        );
        assert_eq!(c.step(), 2);
    }

    #[test]
    fn step_wraps_after_one_bar() {
        let mut c = clock(120.0);
        let sps = c.samples_per_step();

        for _ in 0..STEPS * 2 * sps {
            c.tick();
        }
        assert_eq!(c.step(), 0);
        assert_eq!(c.bars(), 1);

        for _ in 0..STEPS * 2 * sps {
            c.tick();
        }
        assert_eq!(c.step(), 0);
        assert_eq!(c.bars(), 2);
    }

    #[test]
    fn tempo_is_clamped() {
        let mut c = clock(120.0);
        c.set_bpm(1000.0);
        assert_eq!(c.bpm(), MAX_BPM);
        c.set_bpm(1.0);
        assert_eq!(c.bpm(), MIN_BPM);
        c.set_bpm(f64::NAN);
        assert_eq!(c.bpm(), MIN_BPM);
    }

    #[test]
    fn non_positive_tempo_is_rejected() {
        let ctx = EngineContext::default();
        assert!(StepClock::new(&ctx, 0.0).is_err());
        assert!(StepClock::new(&ctx, -120.0).is_err());
        assert!(StepClock::new(&ctx, f64::NAN).is_err());
    }
}
