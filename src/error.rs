//! Error types for the synthesizer core.
//!
//! Errors only cross configuration boundaries: building DSP units, loading
//! samples, accepting note/control events. The per-sample path never returns a
//! `Result`; it clamps instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for synthesizer operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while configuring or driving the synthesizer.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A parameter combination would produce an unstable or meaningless unit.
    #[error("invalid configuration for '{name}': {message}")]
    Configuration {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// A sample resource is missing or corrupt.
    #[error("failed to load sample '{}': {reason}", path.display())]
    ResourceLoad {
        /// Resource path.
        path: PathBuf,
        /// Failure description.
        reason: String,
    },

    /// A note, velocity or controller value outside its valid domain.
    #[error("{name} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        /// What was out of range.
        name: &'static str,
        /// Offending value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// A note in range that no sound answers to.
    #[error("no sound mapped to note {note} (accepted notes: {accepted:?})")]
    UnmappedNote {
        /// Offending note.
        note: u8,
        /// Notes that do have a sound.
        accepted: &'static [u8],
    },

    /// The output sink ran dry before the mixing loop delivered a buffer.
    #[error("audio sink underrun: {frames} frames of silence inserted")]
    Underrun {
        /// Frames the sink had to fill with silence.
        frames: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates a configuration error.
    pub fn configuration(name: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            name,
            message: message.into(),
        }
    }

    /// Creates a resource load error.
    pub fn resource(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an out-of-range error.
    pub fn out_of_range(name: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            name,
            value,
            min,
            max,
        }
    }
}

/// Checks that `value` lies in `min..=max`.
pub(crate) fn ensure_range(name: &'static str, value: i64, min: i64, max: i64) -> SynthResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SynthError::out_of_range(name, value, min, max))
    }
}
