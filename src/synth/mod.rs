// Purpose: the seam between instruments and the mixing loop.
// Instruments implement `Instrument`; control reaches the audio thread only
// through `message` (lock-free queue) and `params` (atomics).

pub mod instrument;
pub mod message;
pub mod params;

pub use instrument::{Instrument, StereoFrame};
pub use message::{EffectChange, EngineMessage, MessageReceiver};
pub use params::{EngineStats, SharedParams};
