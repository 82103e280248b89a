use crate::EngineContext;

/// Feedback delay line used as a send effect.
///
/// Works like a one-tap comb filter without damping. The buffer is allocated
/// once for the longest time; changing the time only moves the wrap point.
pub struct Delay {
    buffer: Box<[f64]>,
    length: usize,
    index: usize,
    feedback: f64,
    input: f64,
    sample_rate: f64,
}

/// Feedback is capped below unity so the line always decays.
pub const MAX_FEEDBACK: f64 = 0.95;

impl Delay {
    pub fn new(ctx: &EngineContext, max_seconds: f64) -> Self {
        let capacity = ((max_seconds.max(0.0) * ctx.sample_rate) as usize).max(1);
        Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            length: capacity,
            index: 0,
            feedback: 0.5,
            input: 0.0,
            sample_rate: ctx.sample_rate,
        }
    }

    /// Set delay length in samples (RT-safe, no allocation).
    pub fn set_length(&mut self, samples: usize) {
        self.length = samples.clamp(1, self.buffer.len());
        if self.index >= self.length {
            self.index = 0;
        }
    }

    pub fn set_time(&mut self, seconds: f64) {
        let samples = (seconds.max(0.0) * self.sample_rate).round() as usize;
        self.set_length(samples);
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn set_feedback(&mut self, feedback: f64) {
        self.feedback = if feedback.is_nan() {
            0.0
        } else {
            feedback.clamp(0.0, MAX_FEEDBACK)
        };
    }

    pub fn feedback(&self) -> f64 {
        self.feedback
    }

    /// Accumulate a send for the next `output()` call.
    #[inline]
    pub fn input(&mut self, sample: f64) {
        self.input += sample;
    }

    /// Read the head, write input plus feedback, clear the accumulator.
    #[inline]
    pub fn output(&mut self) -> f64 {
        let out = self.buffer[self.index];
        self.buffer[self.index] = self.input + out * self.feedback;
        self.input = 0.0;

        self.index += 1;
        if self.index >= self.length {
            self.index = 0;
        }

        out
    }

    pub fn mute(&mut self) {
        self.buffer.fill(0.0);
        self.input = 0.0;
        self.index = 0;
    }
}
