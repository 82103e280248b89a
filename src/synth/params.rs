//! Single-value parameter slots shared between the control side and the
//! mixing thread.
//!
//! Plain numbers cross threads as atomics so the audio thread never takes a
//! lock. Each slot has one writer and one reader; relaxed ordering is enough
//! because no slot guards other memory.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// `f64` stored as its bit pattern.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Parameters the control side writes and the mixer reads every buffer.
#[derive(Debug)]
pub struct SharedParams {
    master_volume: AtomicF64,
    running: AtomicBool,
}

impl SharedParams {
    pub fn new(master_volume: f64) -> Self {
        Self {
            master_volume: AtomicF64::new(master_volume.clamp(0.0, 1.0)),
            running: AtomicBool::new(true),
        }
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume.load()
    }

    /// Clamped to 0..=1; NaN is ignored.
    pub fn set_master_volume(&self, volume: f64) {
        if !volume.is_nan() {
            self.master_volume.store(volume.clamp(0.0, 1.0));
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the output loop to finish its current buffer and stop.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Counters the mixing thread bumps instead of logging.
#[derive(Debug, Default)]
pub struct EngineStats {
    buffers_rendered: AtomicU64,
    rejected_events: AtomicU64,
    underrun_frames: AtomicU64,
}

impl EngineStats {
    pub fn record_buffer(&self) {
        self.buffers_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_event(&self) {
        self.rejected_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_underrun(&self, frames: u64) {
        self.underrun_frames.fetch_add(frames, Ordering::Relaxed);
    }

    pub fn buffers_rendered(&self) -> u64 {
        self.buffers_rendered.load(Ordering::Relaxed)
    }

    pub fn rejected_events(&self) -> u64 {
        self.rejected_events.load(Ordering::Relaxed)
    }

    pub fn underrun_frames(&self) -> u64 {
        self.underrun_frames.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_f64_round_trips_bits() {
        let slot = AtomicF64::new(0.125);
        assert_eq!(slot.load(), 0.125);
        slot.store(-3.5);
        assert_eq!(slot.load(), -3.5);
    }

    #[test]
    fn volume_is_clamped() {
        let params = SharedParams::new(2.0);
        assert_eq!(params.master_volume(), 1.0);
        params.set_master_volume(-1.0);
        assert_eq!(params.master_volume(), 0.0);
        params.set_master_volume(f64::NAN);
        assert_eq!(params.master_volume(), 0.0);
    }

    #[test]
    fn stop_request_is_visible() {
        let params = SharedParams::default();
        assert!(params.is_running());
        params.request_stop();
        assert!(!params.is_running());
    }
}
