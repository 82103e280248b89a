use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::SynthResult;

/// Best-effort append of rendered buffers to a headerless PCM file.
///
/// The first write error is logged and disables the capture; playback goes on.
/// Use [`wrap_raw_pcm`](crate::io::wav::wrap_raw_pcm) to turn the file into a WAV.
pub struct RawCapture {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    bytes: u64,
}

impl RawCapture {
    /// Create (truncate) the capture file.
    pub fn create(path: impl AsRef<Path>) -> SynthResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        info!(path = %path.display(), "capturing raw pcm");
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            bytes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes successfully handed to the file.
    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    pub fn append(&mut self, buffer: &[u8]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write_all(buffer) {
            Ok(()) => self.bytes += buffer.len() as u64,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "capture failed, disabling");
                self.writer = None;
            }
        }
    }

    pub fn finish(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!(path = %self.path.display(), error = %e, "capture flush failed");
            }
        }
    }
}

impl Drop for RawCapture {
    fn drop(&mut self) {
        self.finish();
    }
}
