use crate::SynthResult;

/// One rendered sample of an instrument: dry stereo plus two aux sends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f64,
    pub right: f64,
    /// Amount routed into the delay.
    pub delay_send: f64,
    /// Amount routed into the reverb.
    pub reverb_send: f64,
}

impl StereoFrame {
    /// Mono source at the center with the given send levels.
    pub fn mono(sample: f64, delay: f64, reverb: f64) -> Self {
        Self {
            left: sample,
            right: sample,
            delay_send: sample * delay,
            reverb_send: sample * reverb,
        }
    }
}

impl std::ops::AddAssign for StereoFrame {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
        self.delay_send += rhs.delay_send;
        self.reverb_send += rhs.reverb_send;
    }
}

/// A playable voice driven by note and controller events.
///
/// Instruments are created once at startup, live on the mixing thread and are
/// mutated in place. Event methods validate their arguments and leave the
/// instrument untouched on error; `next_frame` never fails.
pub trait Instrument: Send {
    /// Triggered when a note starts. Velocity spans 0..=255.
    fn note_on(&mut self, note: u8, velocity: u8) -> SynthResult<()>;

    /// Triggered when a note is released.
    fn note_off(&mut self, note: u8, velocity: u8);

    /// Controller numbers are instrument specific; values span 0..=127.
    fn control_change(&mut self, controller: u8, value: u8) -> SynthResult<()>;

    /// Render one sample.
    fn next_frame(&mut self) -> StereoFrame;

    /// Check if this instrument is still producing sound.
    fn is_active(&self) -> bool {
        true
    }

    /// Release everything and silence immediately.
    fn all_notes_off(&mut self);
}

/// Allow boxed instruments to be used as instruments (for dynamic dispatch)
impl Instrument for Box<dyn Instrument> {
    fn note_on(&mut self, note: u8, velocity: u8) -> SynthResult<()> {
        (**self).note_on(note, velocity)
    }

    fn note_off(&mut self, note: u8, velocity: u8) {
        (**self).note_off(note, velocity)
    }

    fn control_change(&mut self, controller: u8, value: u8) -> SynthResult<()> {
        (**self).control_change(controller, value)
    }

    fn next_frame(&mut self) -> StereoFrame {
        (**self).next_frame()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn all_notes_off(&mut self) {
        (**self).all_notes_off()
    }
}

/// Map a 0..=127 controller value to 0.0..=1.0.
#[inline]
pub fn unit_from_cc(value: u8) -> f64 {
    value.min(127) as f64 / 127.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_frame_scales_sends() {
        let frame = StereoFrame::mono(0.5, 0.2, 0.4);
        assert_eq!(frame.left, 0.5);
        assert_eq!(frame.right, 0.5);
        assert!((frame.delay_send - 0.1).abs() < 1e-12);
        assert!((frame.reverb_send - 0.2).abs() < 1e-12);
    }

    #[test]
    fn frames_accumulate() {
        let mut acc = StereoFrame::default();
        acc += StereoFrame::mono(0.25, 1.0, 0.0);
        acc += StereoFrame::mono(0.25, 0.0, 1.0);
        assert_eq!(acc.left, 0.5);
        assert_eq!(acc.delay_send, 0.25);
        assert_eq!(acc.reverb_send, 0.25);
    }

    #[test]
    fn cc_maps_to_unit_range() {
        assert_eq!(unit_from_cc(0), 0.0);
        assert_eq!(unit_from_cc(127), 1.0);
    }
}
