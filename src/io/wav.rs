//! RIFF/WAVE framing for raw 16-bit PCM captures.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::{SynthError, SynthResult, CHANNELS, SAMPLE_RATE};

/// Size of the canonical header in front of the sample data.
pub const HEADER_LEN: usize = 44;

/// WAV format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// 16-bit stereo at the engine rate: what the mixer produces.
    pub fn engine() -> Self {
        Self {
            channels: CHANNELS as u16,
            sample_rate: SAMPLE_RATE as u32,
            bits_per_sample: 16,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

impl Default for WavFormat {
    fn default() -> Self {
        Self::engine()
    }
}

/// Write a complete WAV file (header plus `pcm_data`) to `writer`.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> SynthResult<()> {
    let data_size = u32::try_from(pcm_data.len())
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| {
            SynthError::configuration("wav", format!("{} bytes do not fit a RIFF file", pcm_data.len()))
        })?;
    if pcm_data.len() % format.block_align().max(1) as usize != 0 {
        return Err(SynthError::configuration(
            "wav",
            format!(
                "{} bytes is not a whole number of {}-byte frames",
                pcm_data.len(),
                format.block_align()
            ),
        ));
    }

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&(36 + data_size).to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// WAV file as bytes.
pub fn wav_bytes(format: &WavFormat, pcm_data: &[u8]) -> SynthResult<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_LEN + pcm_data.len());
    write_wav(&mut out, format, pcm_data)?;
    Ok(out)
}

/// Frame a headerless capture file as a WAV file. Returns the data size.
pub fn wrap_raw_pcm(raw: impl AsRef<Path>, wav: impl AsRef<Path>) -> SynthResult<u64> {
    let (raw, wav) = (raw.as_ref(), wav.as_ref());
    let pcm = fs::read(raw).map_err(|e| SynthError::resource(raw, e.to_string()))?;

    let mut out = BufWriter::new(File::create(wav)?);
    write_wav(&mut out, &WavFormat::engine(), &pcm)?;
    out.flush()?;

    info!(
        raw = %raw.display(),
        wav = %wav.display(),
        bytes = pcm.len(),
        "wrapped raw capture"
    );
    Ok(pcm.len() as u64)
}
