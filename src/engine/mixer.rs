/*
Mixer
=====

Renders one buffer of interleaved i16 little-endian stereo at a time.

Per buffer
----------

  1. Drain the control queue. Every message takes effect here, at the buffer
     boundary, never in the middle of a buffer.
  2. Read the master volume once.
  3. Render each frame (below) and pack it as `[L lo, L hi, R lo, R hi]`.

Per frame
---------

    for each track:            sequencer.tick() → instrument.next_frame()
        dry   = blend(dry, frame.left/right)
        sends += frame.delay_send / frame.reverb_send

    delay.input(delay sends)   reverb.add_input(reverb sends)
    dry = blend(dry, delay.output())
    dry = blend(dry, reverb.process())

    out = clip(dry, -1, 1) · master · 32767

`blend` is a running average in `MixMode::Average` (`(a + b) / 2`) and a
plain sum in `MixMode::Sum`. Clipping before quantizing keeps every sum
inside the i16 range, whatever the voices do.
*/

use std::sync::Arc;

use crate::dsp::delay::Delay;
use crate::dsp::reverb::Reverb;
use crate::engine::config::{EngineConfig, MixMode};
use crate::engine::track::Track;
use crate::synth::{EffectChange, EngineMessage, EngineStats, MessageReceiver, SharedParams};
use crate::{EngineContext, CHANNELS};

/// Longest delay time the line is allocated for.
pub const MAX_DELAY_SECONDS: f64 = 2.0;

const BYTES_PER_FRAME: usize = CHANNELS * 2;

pub struct Mixer {
    tracks: Vec<Track>,
    delay: Delay,
    reverb: Reverb,
    mix_mode: MixMode,
    receiver: Box<dyn MessageReceiver + Send>,
    params: Arc<SharedParams>,
    stats: Arc<EngineStats>,
}

impl Mixer {
    pub fn new(
        ctx: &EngineContext,
        config: &EngineConfig,
        receiver: Box<dyn MessageReceiver + Send>,
        params: Arc<SharedParams>,
        stats: Arc<EngineStats>,
    ) -> Self {
        let mut delay = Delay::new(ctx, MAX_DELAY_SECONDS);
        delay.set_time(config.delay_time);
        delay.set_feedback(config.delay_feedback);

        let mut reverb = Reverb::new(ctx);
        reverb.set_room_size(config.reverb_room_size);
        reverb.set_wet(config.reverb_wet);

        Self {
            tracks: Vec::new(),
            delay,
            reverb,
            mix_mode: config.mix_mode,
            receiver,
            params,
            stats,
        }
    }

    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn delay(&self) -> &Delay {
        &self.delay
    }

    pub fn reverb(&self) -> &Reverb {
        &self.reverb
    }

    pub fn mix_mode(&self) -> MixMode {
        self.mix_mode
    }

    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    pub fn stats(&self) -> &Arc<EngineStats> {
        &self.stats
    }

    /// Apply every queued control message.
    pub fn drain_messages(&mut self) {
        while let Some(message) = self.receiver.pop() {
            self.apply(message);
        }
    }

    /// Apply one control message immediately.
    pub fn apply(&mut self, message: EngineMessage) {
        match message {
            EngineMessage::NoteOn {
                track,
                note,
                velocity,
            } => self.with_track(track, |t| t.note_on(note, velocity)),
            EngineMessage::NoteOff {
                track,
                note,
                velocity,
            } => self.with_track(track, |t| {
                t.note_off(note, velocity);
                Ok(())
            }),
            EngineMessage::ControlChange {
                track,
                controller,
                value,
            } => self.with_track(track, |t| t.control_change(controller, value)),
            EngineMessage::SetBassline { track, pattern } => {
                self.with_track(track, |t| t.sequencer_mut().set_bassline(pattern))
            }
            EngineMessage::SetRhythm { track, pattern } => {
                self.with_track(track, |t| t.sequencer_mut().set_rhythm(pattern))
            }
            EngineMessage::SetTempo { bpm } => {
                for track in &mut self.tracks {
                    track.sequencer_mut().set_bpm(bpm);
                }
            }
            EngineMessage::Effect(change) => self.apply_effect(change),
            EngineMessage::AllNotesOff => {
                for track in &mut self.tracks {
                    track.all_notes_off();
                }
            }
            EngineMessage::Stop => self.stop(),
        }
    }

    fn with_track(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Track) -> crate::SynthResult<()>,
    ) {
        match self.tracks.get_mut(index) {
            Some(track) => {
                if f(track).is_err() {
                    track.fault(&self.stats);
                }
            }
            None => self.stats.record_rejected_event(),
        }
    }

    fn apply_effect(&mut self, change: EffectChange) {
        match change {
            EffectChange::DelayTime { seconds } => self.delay.set_time(seconds),
            EffectChange::DelayFeedback(v) => self.delay.set_feedback(v),
            EffectChange::ReverbRoomSize(v) => self.reverb.set_room_size(v),
            EffectChange::ReverbDamp(v) => self.reverb.set_damp(v),
            EffectChange::ReverbWet(v) => self.reverb.set_wet(v),
            EffectChange::ReverbDry(v) => self.reverb.set_dry(v),
            EffectChange::ReverbWidth(v) => self.reverb.set_width(v),
            EffectChange::ReverbMode(v) => self.reverb.set_mode(v),
        }
    }

    #[inline]
    fn blend(mode: MixMode, acc: f64, source: f64) -> f64 {
        match mode {
            MixMode::Average => (acc + source) * 0.5,
            MixMode::Sum => acc + source,
        }
    }

    /// One stereo frame in -1..=1.
    #[inline]
    fn frame(&mut self) -> (f64, f64) {
        let mode = self.mix_mode;
        let (mut left, mut right) = (0.0, 0.0);
        let (mut delay_send, mut reverb_send) = (0.0, 0.0);

        for track in &mut self.tracks {
            let frame = track.tick(&self.stats);
            left = Self::blend(mode, left, frame.left);
            right = Self::blend(mode, right, frame.right);
            delay_send += frame.delay_send;
            reverb_send += frame.reverb_send;
        }

        self.delay.input(delay_send);
        self.reverb.add_input(reverb_send, reverb_send);

        let echo = self.delay.output();
        left = Self::blend(mode, left, echo);
        right = Self::blend(mode, right, echo);

        let (wet_l, wet_r) = self.reverb.process();
        left = Self::blend(mode, left, wet_l);
        right = Self::blend(mode, right, wet_r);

        // NaN from a misbehaving voice becomes silence rather than full scale.
        let clip = |x: f64| if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) };
        (clip(left), clip(right))
    }

    /// Render `out.len() / 4` frames into `out`. Trailing bytes that do not
    /// make up a whole frame are zeroed.
    pub fn render_buffer(&mut self, out: &mut [u8]) {
        self.drain_messages();
        let scale = self.params.master_volume() * i16::MAX as f64;

        let mut frames = out.chunks_exact_mut(BYTES_PER_FRAME);
        for chunk in &mut frames {
            let (left, right) = self.frame();
            let l = (left * scale) as i16;
            let r = (right * scale) as i16;
            chunk[..2].copy_from_slice(&l.to_le_bytes());
            chunk[2..].copy_from_slice(&r.to_le_bytes());
        }
        frames.into_remainder().fill(0);

        self.stats.record_buffer();
    }

    /// Render `frames` frames into a new buffer (offline use).
    pub fn render_frames(&mut self, frames: usize) -> Vec<u8> {
        let mut out = vec![0u8; frames * BYTES_PER_FRAME];
        self.render_buffer(&mut out);
        out
    }

    /// Silence everything: notes off, sequencers rewound, effect tails flushed.
    ///
    /// A frozen reverb is unfrozen first so its tail can be cleared.
    pub fn stop(&mut self) {
        for track in &mut self.tracks {
            track.all_notes_off();
            track.sequencer_mut().reset();
        }
        self.delay.mute();
        if self.reverb.is_frozen() {
            self.reverb.set_mode(0.0);
        }
        self.reverb.mute();
    }
}
