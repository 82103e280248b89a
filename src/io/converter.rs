use crate::io::midi::{MidiEvent, ALL_NOTES_OFF_CC};
use crate::synth::EngineMessage;

/// MIDI velocity 0..=127 onto the engine's 0..=255 range (127 maps to 254).
#[inline]
pub fn midi_velocity(velocity: u8) -> u8 {
    velocity.min(127) * 2
}

/// Convert a MIDI event to an engine message; the channel picks the track.
///
/// Events on channels without a track are dropped.
pub fn midi_to_message(midi: MidiEvent, tracks: usize) -> Option<EngineMessage> {
    let track = midi.channel() as usize;
    if track >= tracks {
        return None;
    }

    Some(match midi {
        MidiEvent::NoteOn { key, velocity, .. } => EngineMessage::NoteOn {
            track,
            note: key,
            velocity: midi_velocity(velocity),
        },
        MidiEvent::NoteOff { key, velocity, .. } => EngineMessage::NoteOff {
            track,
            note: key,
            velocity: midi_velocity(velocity),
        },
        MidiEvent::ControlChange {
            controller: ALL_NOTES_OFF_CC,
            ..
        } => EngineMessage::AllNotesOff,
        MidiEvent::ControlChange {
            controller, value, ..
        } => EngineMessage::ControlChange {
            track,
            controller,
            value,
        },
    })
}
