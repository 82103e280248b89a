use crate::SynthResult;

/// Destination for rendered buffers: interleaved little-endian i16 stereo at
/// the engine rate.
///
/// `write` may block; a real-time sink blocks until the device has room, which
/// is what paces the mixing loop. A sink that had to play silence because the
/// loop fell behind reports it as [`SynthError::Underrun`](crate::SynthError::Underrun)
/// after accepting the buffer.
pub trait AudioSink: Send {
    fn write(&mut self, buffer: &[u8]) -> SynthResult<()>;

    /// Block until everything written has been played.
    fn flush(&mut self) -> SynthResult<()> {
        Ok(())
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn write(&mut self, buffer: &[u8]) -> SynthResult<()> {
        (**self).write(buffer)
    }

    fn flush(&mut self) -> SynthResult<()> {
        (**self).flush()
    }
}

/// Sink that keeps everything in memory, for offline renders and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    data: Vec<u8>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Number of buffers written.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Decoded (left, right) frames.
    pub fn frames(&self) -> Vec<(i16, i16)> {
        self.data
            .chunks_exact(4)
            .map(|f| {
                (
                    i16::from_le_bytes([f[0], f[1]]),
                    i16::from_le_bytes([f[2], f[3]]),
                )
            })
            .collect()
    }
}

impl AudioSink for MemorySink {
    fn write(&mut self, buffer: &[u8]) -> SynthResult<()> {
        self.data.extend_from_slice(buffer);
        self.writes += 1;
        Ok(())
    }
}
