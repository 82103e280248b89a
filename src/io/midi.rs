/// Channel-tagged MIDI-style events from an external controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

/// Controller number that means "all notes off" on its channel.
pub const ALL_NOTES_OFF_CC: u8 = 123;

impl MidiEvent {
    /// Parse a channel voice message from raw bytes.
    ///
    /// Unsupported status bytes and short messages yield `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0f;
        let (d1, d2) = match data {
            [d1, d2, ..] => (d1 & 0x7f, d2 & 0x7f),
            _ => return None,
        };

        match status & 0xf0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: d1,
                velocity: d2,
            }),
            // Note-on with velocity 0 is a note-off by convention.
            0x90 if d2 == 0 => Some(MidiEvent::NoteOff {
                channel,
                key: d1,
                velocity: 0,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: d1,
                velocity: d2,
            }),
            0xb0 => Some(MidiEvent::ControlChange {
                channel,
                controller: d1,
                value: d2,
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. } => channel,
        }
    }
}
