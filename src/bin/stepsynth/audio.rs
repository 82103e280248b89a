//! cpal output: the mixing loop pushes i16 samples into a ring, the device
//! callback pulls them out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, PushError, RingBuffer};
use tracing::{error, info};

use stepsynth::io::AudioSink;
use stepsynth::{SynthError, SynthResult, CHANNELS, SAMPLE_RATE};

/// How long the writer sleeps while the ring is full.
const POLL: Duration = Duration::from_millis(1);

/// Writing half of the device ring. Blocks while the ring is full.
pub struct CpalSink {
    producer: Producer<i16>,
    missing: Arc<AtomicU64>,
}

impl AudioSink for CpalSink {
    fn write(&mut self, buffer: &[u8]) -> SynthResult<()> {
        for pair in buffer.chunks_exact(2) {
            let mut sample = i16::from_le_bytes([pair[0], pair[1]]);
            loop {
                match self.producer.push(sample) {
                    Ok(()) => break,
                    Err(PushError::Full(s)) => {
                        if self.producer.is_abandoned() {
                            return Err(SynthError::configuration(
                                "audio",
                                "output stream closed",
                            ));
                        }
                        sample = s;
                        thread::sleep(POLL);
                    }
                }
            }
        }

        let missing = self.missing.swap(0, Ordering::Relaxed);
        if missing > 0 {
            return Err(SynthError::Underrun {
                frames: missing / CHANNELS as u64,
            });
        }
        Ok(())
    }

    fn flush(&mut self) -> SynthResult<()> {
        let capacity = self.producer.buffer().capacity();
        while self.producer.slots() < capacity && !self.producer.is_abandoned() {
            thread::sleep(POLL);
        }
        Ok(())
    }
}

/// Open the default output device at the engine rate.
///
/// The returned stream must stay alive (and on this thread) while the sink
/// is in use.
pub fn open(ring_frames: usize) -> EyreResult<(CpalSink, cpal::Stream)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let format = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?
        .sample_format();

    let config = cpal::StreamConfig {
        channels: CHANNELS as u16,
        sample_rate: cpal::SampleRate(SAMPLE_RATE as u32),
        buffer_size: cpal::BufferSize::Default,
    };

    let (producer, consumer) = RingBuffer::<i16>::new(ring_frames * CHANNELS);
    let missing = Arc::new(AtomicU64::new(0));
    let mut reader = RingReader {
        consumer,
        missing: Arc::clone(&missing),
        primed: false,
    };

    let err_fn = |err| error!(%err, "audio stream error");
    let stream = match format {
        cpal::SampleFormat::I16 => device.build_output_stream(
            &config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| reader.fill(data, |s| s),
            err_fn,
            None,
        ),
        _ => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                reader.fill(data, |s| s as f32 / 32768.0)
            },
            err_fn,
            None,
        ),
    }
    .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    info!(
        device = device.name().unwrap_or_default(),
        ?format,
        sample_rate = SAMPLE_RATE,
        ring_frames,
        "audio output opened"
    );
    Ok((CpalSink { producer, missing }, stream))
}

/// Reading half, owned by the device callback.
struct RingReader {
    consumer: Consumer<i16>,
    missing: Arc<AtomicU64>,
    /// No underruns are counted before the first sample arrives.
    primed: bool,
}

impl RingReader {
    fn fill<T: Default>(&mut self, data: &mut [T], convert: impl Fn(i16) -> T) {
        let mut short = 0u64;
        for slot in data.iter_mut() {
            match self.consumer.pop() {
                Ok(s) => {
                    self.primed = true;
                    *slot = convert(s);
                }
                Err(_) => {
                    short += 1;
                    *slot = T::default();
                }
            }
        }
        if self.primed && short > 0 {
            self.missing.fetch_add(short, Ordering::Relaxed);
        }
    }
}
