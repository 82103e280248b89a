//! External interfaces: sinks, capture files, WAV framing, sample loading and
//! MIDI-style control input.

pub mod capture;
pub mod converter;
pub mod loader;
pub mod midi;
pub mod sink;
pub mod wav;

pub use capture::RawCapture;
pub use converter::midi_to_message;
pub use loader::{load_cyclic, load_raw_pcm, SampleBank};
pub use midi::MidiEvent;
pub use sink::{AudioSink, MemorySink};
pub use wav::{wrap_raw_pcm, write_wav, WavFormat};
