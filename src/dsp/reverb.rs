//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation is the Freeverb
//! flavour of the Schroeder reverb: eight parallel comb filters per channel
//! followed by four all-pass filters in series.
//!
//! # Architecture (per channel)
//!
//! ```text
//! Input ──┬──→ [Comb 1116] ──┐
//!         ├──→ [Comb 1188] ──┤
//!         ├──→    ...      ──┼──→ (+) ──→ [AP 556] ──→ [AP 441] ──→ [AP 341] ──→ [AP 225] ──→ Out
//!         └──→ [Comb 1617] ──┘
//! ```
//!
//! The right channel uses the same network with every delay line 23 samples
//! longer. The offset decorrelates the channels and gives the stereo image.
//!
//! ## Comb Filters
//!
//! Each comb filter feeds its output back through a one-pole lowpass
//! (`damp`), which emulates high frequencies being absorbed by the room:
//!
//! ```text
//! y[n]        = buf[n - delay]
//! store       = y[n] * (1 - damp) + store * damp
//! buf[n]      = x[n] + store * feedback
//! ```
//!
//! ## All-pass Filters
//!
//! All-pass filters pass all frequencies equally but smear their phase, which
//! adds echo density without colouring the sound.
//!
//! ```text
//! y[n]        = -x[n] + buf[n - delay]
//! buf[n]      = x[n] + buf[n - delay] * feedback
//! ```
//!
//! # Block Protocol
//!
//! Sources add their sends with `add_input()`. `process()` consumes the
//! accumulated input, produces one stereo sample and clears the accumulators,
//! so the input has to be re-added before the next call.
//!
//! # Freeze
//!
//! With `mode >= 0.5` the combs get a feedback of exactly 1.0, no damping and
//! no input: the current tail circulates forever. Setting the mode back below
//! 0.5 restores the normal coefficients and the frozen tail decays away.

use crate::{EngineContext, DENORMAL_GUARD};

const NUM_COMBS: usize = 8;
const NUM_ALLPASSES: usize = 4;
const MUTED: f64 = 0.0;
const FIXED_GAIN: f64 = 0.015;
const SCALE_WET: f64 = 3.0;
const SCALE_DRY: f64 = 2.0;
const SCALE_DAMP: f64 = 0.4;
const SCALE_ROOM: f64 = 0.28;
const OFFSET_ROOM: f64 = 0.7;
const INITIAL_ROOM: f64 = 0.5;
const INITIAL_DAMP: f64 = 0.5;
const INITIAL_WET: f64 = 1.0 / SCALE_WET;
const INITIAL_DRY: f64 = 0.0;
const INITIAL_WIDTH: f64 = 1.0;
const INITIAL_MODE: f64 = 0.0;
const FREEZE_MODE: f64 = 0.5;
const ALLPASS_FEEDBACK: f64 = 0.5;

/// Offset added to every right-channel delay line.
pub const STEREO_SPREAD: usize = 23;
/// Left-channel comb lengths at 44.1 kHz.
pub const COMB_TUNING: [usize; NUM_COMBS] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
/// Left-channel all-pass lengths at 44.1 kHz.
pub const ALLPASS_TUNING: [usize; NUM_ALLPASSES] = [556, 441, 341, 225];

/// Lowpass-feedback comb filter over a fixed circular buffer.
pub struct CombFilter {
    buffer: Box<[f64]>,
    index: usize,
    feedback: f64,
    filterstore: f64,
    damp1: f64,
    damp2: f64,
}

impl CombFilter {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)].into_boxed_slice(),
            index: 0,
            feedback: 0.0,
            filterstore: 0.0,
            damp1: 0.0,
            damp2: 1.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f64) {
        self.feedback = feedback;
    }

    pub fn feedback(&self) -> f64 {
        self.feedback
    }

    pub fn set_damp(&mut self, damp: f64) {
        self.damp1 = damp;
        self.damp2 = 1.0 - damp;
    }

    pub fn damp(&self) -> f64 {
        self.damp1
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.index];

        self.filterstore = output * self.damp2 + self.filterstore * self.damp1 + DENORMAL_GUARD;
        self.buffer[self.index] = input + self.filterstore * self.feedback;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        output
    }

    pub fn mute(&mut self) {
        self.buffer.fill(0.0);
        self.filterstore = 0.0;
    }
}

/// Schroeder all-pass diffuser over a fixed circular buffer.
pub struct AllpassFilter {
    buffer: Box<[f64]>,
    index: usize,
    feedback: f64,
}

impl AllpassFilter {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)].into_boxed_slice(),
            index: 0,
            feedback: ALLPASS_FEEDBACK,
        }
    }

    pub fn set_feedback(&mut self, feedback: f64) {
        self.feedback = feedback;
    }

    pub fn feedback(&self) -> f64 {
        self.feedback
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let bufout = self.buffer[self.index];
        let output = -input + bufout;

        self.buffer[self.index] = input + bufout * self.feedback;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        output
    }

    pub fn mute(&mut self) {
        self.buffer.fill(0.0);
    }
}

/// Stereo Freeverb network.
pub struct Reverb {
    comb_l: [CombFilter; NUM_COMBS],
    comb_r: [CombFilter; NUM_COMBS],
    allpass_l: [AllpassFilter; NUM_ALLPASSES],
    allpass_r: [AllpassFilter; NUM_ALLPASSES],

    // Public (normalized 0..1) controls
    room_size: f64,
    damp: f64,
    wet: f64,
    dry: f64,
    width: f64,
    mode: f64,

    // Derived coefficients
    gain: f64,
    roomsize1: f64,
    damp1: f64,
    wet1: f64,
    wet2: f64,

    input_l: f64,
    input_r: f64,
}

impl Reverb {
    /// Build the network with delay lines scaled from the 44.1 kHz tuning.
    pub fn new(ctx: &EngineContext) -> Self {
        let comb = |i: usize, spread: usize| CombFilter::new(ctx.scale_tuning(COMB_TUNING[i] + spread));
        let allpass =
            |i: usize, spread: usize| AllpassFilter::new(ctx.scale_tuning(ALLPASS_TUNING[i] + spread));

        let mut reverb = Self {
            comb_l: std::array::from_fn(|i| comb(i, 0)),
            comb_r: std::array::from_fn(|i| comb(i, STEREO_SPREAD)),
            allpass_l: std::array::from_fn(|i| allpass(i, 0)),
            allpass_r: std::array::from_fn(|i| allpass(i, STEREO_SPREAD)),
            room_size: 0.0,
            damp: 0.0,
            wet: 0.0,
            dry: 0.0,
            width: 0.0,
            mode: 0.0,
            gain: FIXED_GAIN,
            roomsize1: 0.0,
            damp1: 0.0,
            wet1: 0.0,
            wet2: 0.0,
            input_l: 0.0,
            input_r: 0.0,
        };

        reverb.set_wet(INITIAL_WET);
        reverb.set_room_size(INITIAL_ROOM);
        reverb.set_dry(INITIAL_DRY);
        reverb.set_damp(INITIAL_DAMP);
        reverb.set_width(INITIAL_WIDTH);
        reverb.set_mode(INITIAL_MODE);
        reverb.mute();
        reverb
    }

    /// Recompute derived coefficients and push them into the combs.
    pub fn update(&mut self) {
        self.wet1 = self.wet * (self.width / 2.0 + 0.5);
        self.wet2 = self.wet * ((1.0 - self.width) / 2.0);

        if self.is_frozen() {
            self.roomsize1 = 1.0;
            self.damp1 = 0.0;
            self.gain = MUTED;
        } else {
            self.roomsize1 = self.room_size;
            self.damp1 = self.damp;
            self.gain = FIXED_GAIN;
        }

        for comb in self.comb_l.iter_mut().chain(self.comb_r.iter_mut()) {
            comb.set_feedback(self.roomsize1);
            comb.set_damp(self.damp1);
        }
    }

    pub fn set_room_size(&mut self, value: f64) {
        self.room_size = value.clamp(0.0, 1.0) * SCALE_ROOM + OFFSET_ROOM;
        self.update();
    }

    pub fn room_size(&self) -> f64 {
        (self.room_size - OFFSET_ROOM) / SCALE_ROOM
    }

    pub fn set_damp(&mut self, value: f64) {
        self.damp = value.clamp(0.0, 1.0) * SCALE_DAMP;
        self.update();
    }

    pub fn damp(&self) -> f64 {
        self.damp / SCALE_DAMP
    }

    pub fn set_wet(&mut self, value: f64) {
        self.wet = value.clamp(0.0, 1.0) * SCALE_WET;
        self.update();
    }

    pub fn wet(&self) -> f64 {
        self.wet / SCALE_WET
    }

    pub fn set_dry(&mut self, value: f64) {
        self.dry = value.clamp(0.0, 1.0) * SCALE_DRY;
    }

    pub fn dry(&self) -> f64 {
        self.dry / SCALE_DRY
    }

    pub fn set_width(&mut self, value: f64) {
        self.width = value.clamp(0.0, 1.0);
        self.update();
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// `>= 0.5` freezes the tail; anything lower returns to normal decay.
    pub fn set_mode(&mut self, value: f64) {
        self.mode = value.clamp(0.0, 1.0);
        self.update();
    }

    pub fn mode(&self) -> f64 {
        self.mode
    }

    pub fn is_frozen(&self) -> bool {
        self.mode >= FREEZE_MODE
    }

    /// Accumulate a stereo send for the next `process()` call.
    #[inline]
    pub fn add_input(&mut self, left: f64, right: f64) {
        self.input_l += left;
        self.input_r += right;
    }

    /// Run one sample through the network and clear the input accumulators.
    #[inline]
    pub fn process(&mut self) -> (f64, f64) {
        let input = (self.input_l + self.input_r) * self.gain;

        let mut out_l = 0.0;
        let mut out_r = 0.0;
        for (l, r) in self.comb_l.iter_mut().zip(self.comb_r.iter_mut()) {
            out_l += l.process(input);
            out_r += r.process(input);
        }

        for (l, r) in self.allpass_l.iter_mut().zip(self.allpass_r.iter_mut()) {
            out_l = l.process(out_l);
            out_r = r.process(out_r);
        }

        let left = out_l * self.wet1 + out_r * self.wet2 + self.input_l * self.dry;
        let right = out_r * self.wet1 + out_l * self.wet2 + self.input_r * self.dry;

        self.input_l = 0.0;
        self.input_r = 0.0;

        (left, right)
    }

    /// Zero every delay line. Ignored while frozen.
    pub fn mute(&mut self) {
        if self.is_frozen() {
            return;
        }

        for comb in self.comb_l.iter_mut().chain(self.comb_r.iter_mut()) {
            comb.mute();
        }
        for allpass in self.allpass_l.iter_mut().chain(self.allpass_r.iter_mut()) {
            allpass.mute();
        }
        self.input_l = 0.0;
        self.input_r = 0.0;
    }

    pub fn comb_feedback(&self) -> f64 {
        self.roomsize1
    }

    pub fn input_gain(&self) -> f64 {
        self.gain
    }
}
