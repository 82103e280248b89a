use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::mixer::Mixer;
use crate::io::capture::RawCapture;
use crate::io::sink::AudioSink;
use crate::synth::{EngineStats, SharedParams};
use crate::{SynthError, SynthResult};

/// The real-time loop: render a buffer, hand it to the sink, repeat.
///
/// The sink's blocking `write` paces the loop. The loop checks the shared
/// `running` flag between buffers; when it clears, the mixer is stopped so no
/// delay or reverb tail is left behind.
pub struct OutputLoop<S: AudioSink> {
    mixer: Mixer,
    sink: S,
    capture: Option<RawCapture>,
    buffer: Box<[u8]>,
    params: Arc<SharedParams>,
    stats: Arc<EngineStats>,
    reported_rejections: u64,
}

impl<S: AudioSink> OutputLoop<S> {
    pub fn new(mixer: Mixer, sink: S, buffer_bytes: usize) -> Self {
        let params = Arc::clone(mixer.params());
        let stats = Arc::clone(mixer.stats());
        Self {
            mixer,
            sink,
            capture: None,
            buffer: vec![0u8; buffer_bytes].into_boxed_slice(),
            params,
            stats,
            reported_rejections: 0,
        }
    }

    /// Also append every buffer to a raw capture file.
    pub fn with_capture(mut self, capture: RawCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until the running flag clears.
    pub fn run(&mut self) -> SynthResult<()> {
        info!(
            buffer_bytes = self.buffer.len(),
            tracks = self.mixer.tracks().len(),
            "output loop started"
        );
        while self.params.is_running() {
            self.cycle()?;
        }
        self.finish()
    }

    /// Run exactly `buffers` cycles (or fewer if stopped), then finish.
    pub fn run_buffers(&mut self, buffers: usize) -> SynthResult<()> {
        for _ in 0..buffers {
            if !self.params.is_running() {
                break;
            }
            self.cycle()?;
        }
        self.finish()
    }

    /// Render, write and capture one buffer.
    pub fn cycle(&mut self) -> SynthResult<()> {
        self.mixer.render_buffer(&mut self.buffer);

        match self.sink.write(&self.buffer) {
            Ok(()) => {}
            Err(SynthError::Underrun { frames }) => {
                self.stats.record_underrun(frames);
                warn!(frames, "audio sink underrun");
            }
            Err(e) => return Err(e),
        }

        if let Some(capture) = self.capture.as_mut() {
            capture.append(&self.buffer);
        }

        let rejected = self.stats.rejected_events();
        if rejected != self.reported_rejections {
            warn!(
                new = rejected - self.reported_rejections,
                total = rejected,
                "rejected events muted their voices"
            );
            self.reported_rejections = rejected;
        }
        Ok(())
    }

    fn finish(&mut self) -> SynthResult<()> {
        self.mixer.stop();
        self.sink.flush()?;
        if let Some(capture) = self.capture.as_mut() {
            capture.finish();
        }
        info!(
            buffers = self.stats.buffers_rendered(),
            underrun_frames = self.stats.underrun_frames(),
            "output loop stopped"
        );
        Ok(())
    }

    pub fn into_parts(self) -> (Mixer, S) {
        (self.mixer, self.sink)
    }
}
