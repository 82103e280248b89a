//! Distortion / Waveshaping
//!
//! The acid voice pushes its filtered signal through a soft-clip waveshaper
//! and then through a half-band decimation filter that colours the tone.
//!
//! # Soft Clip
//!
//! The transfer function is a rational approximation of `tanh`:
//!
//!   f(s) = s * (27 + s²) / (27 + 9s²)     for |s| < 3
//!   f(s) = ±1                             beyond
//!
//! At `|s| = 3` both branches meet at exactly ±1, so the curve is continuous.
//! The input is scaled by `gain = 1/ratio` and the output by
//! `makeup = 0.9 * ratio + 0.1`: turning the ratio down drives harder into the
//! clip while pulling the output level back.
//!
//! # Decimator
//!
//! A 9-tap half-band FIR. Half-band filters have every even tap (except the
//! centre) equal to zero, so the folded delay chain only needs the odd
//! coefficients. Each call consumes two input samples and emits one.

/// Soft-clip waveshaper followed by the half-band decimator.
#[derive(Debug, Clone)]
pub struct Distortion {
    ratio: f64,
    gain: f64,
    makeup: f64,
    last: f64,
    decimator: Decimator,
}

impl Distortion {
    pub fn new(ratio: f64) -> Self {
        let mut dist = Self {
            ratio: 1.0,
            gain: 1.0,
            makeup: 1.0,
            last: 0.0,
            decimator: Decimator::new(),
        };
        dist.set_ratio(ratio);
        dist
    }

    /// Ratio in 0.01..=1; lower drives harder.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = if ratio.is_nan() { 1.0 } else { ratio.clamp(0.01, 1.0) };
        self.gain = 1.0 / self.ratio;
        self.makeup = self.ratio * 0.9 + 0.1;
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn makeup(&self) -> f64 {
        self.makeup
    }

    /// The bare waveshaper.
    #[inline]
    pub fn dist(&self, input: f64) -> f64 {
        let s = input * self.gain;
        if s >= 3.0 {
            self.makeup
        } else if s <= -3.0 {
            -self.makeup
        } else {
            let s2 = s * s;
            self.makeup * s * (27.0 + s2) / (27.0 + 9.0 * s2)
        }
    }

    /// Waveshape, average with the previous shaped sample, then decimate.
    #[inline]
    pub fn distort(&mut self, input: f64) -> f64 {
        let shaped = self.dist(input);
        let smoothed = 0.5 * (shaped + self.last);
        self.last = shaped;
        self.decimator.process(smoothed, shaped)
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
        self.decimator.reset();
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self::new(1.0)
    }
}

const H0: f64 = 8192.0 / 16384.0;
const H1: f64 = 5042.0 / 16384.0;
const H3: f64 = -1277.0 / 16384.0;
const H5: f64 = 429.0 / 16384.0;
const H7: f64 = -116.0 / 16384.0;
const H9: f64 = 18.0 / 16384.0;

/// 9-tap half-band FIR realised as a folded delay chain.
#[derive(Debug, Clone, Default)]
pub struct Decimator {
    r: [f64; 9],
}

impl Decimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push two input samples, get one output sample.
    ///
    /// `x0` runs through the odd (symmetric) taps, `x1` through the centre tap.
    #[inline]
    pub fn process(&mut self, x0: f64, x1: f64) -> f64 {
        let h9x0 = H9 * x0;
        let h7x0 = H7 * x0;
        let h5x0 = H5 * x0;
        let h3x0 = H3 * x0;
        let h1x0 = H1 * x0;
        let r = &mut self.r;

        let out = r[8] + h9x0;
        r[8] = r[7] + h7x0;
        r[7] = r[6] + h5x0;
        r[6] = r[5] + h3x0;
        r[5] = r[4] + h1x0;
        r[4] = r[3] + h1x0 + H0 * x1;
        r[3] = r[2] + h3x0;
        r[2] = r[1] + h5x0;
        r[1] = r[0] + h7x0;
        r[0] = h9x0;

        out
    }

    pub fn reset(&mut self) {
        self.r = [0.0; 9];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_in_zero_out() {
        for ratio in [0.01, 0.1, 0.5, 1.0] {
            assert_eq!(Distortion::new(ratio).dist(0.0), 0.0);
        }
    }

    #[test]
    fn hard_clips_past_the_knee() {
        let dist = Distortion::new(0.25);
        // gain = 4: inputs past 0.75 scale beyond |3|.
        assert_eq!(dist.dist(0.8), dist.makeup());
        assert_eq!(dist.dist(-5.0), -dist.makeup());
        assert!((dist.makeup() - 0.325).abs() < 1e-12);
    }

    #[test]
    fn curve_is_continuous_at_the_knee() {
        let dist = Distortion::new(1.0);
        let inside = dist.dist(2.999_999);
        assert!((inside - 1.0).abs() < 1e-5);
    }

    #[test]
    fn curve_is_monotonic() {
        let dist = Distortion::new(0.3);
        let mut prev = dist.dist(-4.0);
        for i in -399..=400 {
            let next = dist.dist(i as f64 * 0.01);
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn ratio_is_clamped() {
        let mut dist = Distortion::new(0.0);
        assert_eq!(dist.ratio(), 0.01);
        dist.set_ratio(5.0);
        assert_eq!(dist.ratio(), 1.0);
    }

    #[test]
    fn decimator_passes_dc_at_unity() {
        let mut dec = Decimator::new();
        let mut last = 0.0;
        for _ in 0..32 {
            last = dec.process(1.0, 1.0);
        }
        // Sum of all taps: h0 + 2*(h1 + h3 + h5 + h7 + h9) = 1.0
        assert!((last - 1.0).abs() < 1e-9);
    }

    #[test]
    fn distort_output_is_bounded() {
        let mut dist = Distortion::new(0.05);
        for i in 0..1000 {
            let x = ((i as f64) * 0.37).sin() * 10.0;
            let y = dist.distort(x);
            assert!(y.abs() <= 1.5, "decimated output too hot: {y}");
        }
    }
}
