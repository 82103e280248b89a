#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::sequencing::{BasslinePattern, RhythmPattern};

/// Parameter changes for the shared send effects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EffectChange {
    DelayTime { seconds: f64 },
    DelayFeedback(f64),
    ReverbRoomSize(f64),
    ReverbDamp(f64),
    ReverbWet(f64),
    ReverbDry(f64),
    ReverbWidth(f64),
    /// `>= 0.5` freezes the reverb tail.
    ReverbMode(f64),
}

/// Everything the control side can ask of the mixing thread.
///
/// Messages are applied at the start of the next rendered buffer.
#[derive(Debug, Copy, Clone)]
pub enum EngineMessage {
    NoteOn { track: usize, note: u8, velocity: u8 },
    NoteOff { track: usize, note: u8, velocity: u8 },
    ControlChange { track: usize, controller: u8, value: u8 },
    SetBassline { track: usize, pattern: BasslinePattern },
    SetRhythm { track: usize, pattern: RhythmPattern },
    SetTempo { bpm: f64 },
    Effect(EffectChange),
    AllNotesOff,
    /// Silence instruments and flush delay and reverb tails.
    Stop,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

/// Receiver that never yields anything, for offline renders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessages;

impl MessageReceiver for NoMessages {
    fn pop(&mut self) -> Option<EngineMessage> {
        None
    }
}

impl<R: MessageReceiver + ?Sized> MessageReceiver for Box<R> {
    fn pop(&mut self) -> Option<EngineMessage> {
        (**self).pop()
    }
}
