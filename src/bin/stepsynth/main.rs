//! stepsynth - acid bassline and drum machine
//!
//! Run with: cargo run -- play

mod audio;
mod control;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stepsynth::engine::{self, EngineConfig, MixMode, OutputLoop};
use stepsynth::io::{wrap_raw_pcm, write_wav, RawCapture, WavFormat};
use stepsynth::{BUFFER_FRAMES, SAMPLE_RATE};

#[derive(Parser)]
#[command(name = "stepsynth")]
#[command(about = "Step-sequenced acid bassline and drum machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play live through the default output device, controlled from stdin
    Play {
        #[command(flatten)]
        engine: EngineArgs,

        /// Also write the raw output stream to this file
        #[arg(long)]
        capture: Option<PathBuf>,
    },

    /// Render to a WAV file without touching the audio device
    Render {
        /// Output WAV file path
        output: PathBuf,

        /// Length in bars of 16 steps
        #[arg(short, long, default_value = "4")]
        bars: u32,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Wrap a raw capture in a WAV header
    Wrap {
        /// Headerless 16-bit stereo capture
        input: PathBuf,

        /// Output WAV file path
        output: PathBuf,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Tempo in beats per minute
    #[arg(short, long, default_value = "120")]
    bpm: f64,

    /// Master volume 0.0-1.0
    #[arg(short, long, default_value = "0.8")]
    volume: f64,

    /// Pattern seed
    #[arg(short, long, default_value = "1")]
    seed: u32,

    /// MIDI note the bassline is built on
    #[arg(long, default_value = "36")]
    bass_note: u8,

    /// Line the bassline up with the bass drum
    #[arg(long)]
    prefer_bass_drum: bool,

    /// Line the bassline up with the snare
    #[arg(long)]
    prefer_snare_drum: bool,

    /// Directory with bd.raw, sd.raw, ... drum samples
    #[arg(long)]
    samples: Option<PathBuf>,

    /// Sum tracks instead of blending them
    #[arg(long)]
    sum: bool,
}

impl EngineArgs {
    fn config(self) -> EngineConfig {
        EngineConfig {
            bpm: self.bpm,
            master_volume: self.volume,
            seed: self.seed,
            mix_mode: if self.sum { MixMode::Sum } else { MixMode::Average },
            bass_note: self.bass_note,
            prefer_bass_drum: self.prefer_bass_drum,
            prefer_snare_drum: self.prefer_snare_drum,
            samples_dir: self.samples,
            ..Default::default()
        }
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Play { engine, capture } => play(EngineConfig {
            capture,
            ..engine.config()
        }),
        Commands::Render {
            output,
            bars,
            engine,
        } => render(&engine.config(), bars, &output),
        Commands::Wrap { input, output } => {
            let bytes = wrap_raw_pcm(&input, &output)
                .wrap_err_with(|| format!("failed to wrap {}", input.display()))?;
            info!(bytes, output = %output.display(), "wrapped");
            Ok(())
        }
    }
}

fn play(config: EngineConfig) -> EyreResult<()> {
    let (mixer, handle) = engine::build(&config).wrap_err("failed to build engine")?;
    let (sink, _stream) = audio::open(BUFFER_FRAMES * 2)?;

    let mut output = OutputLoop::new(mixer, sink, config.buffer_bytes);
    if let Some(path) = &config.capture {
        output = output.with_capture(RawCapture::create(path)?);
    }

    let control_config = config.clone();
    thread::spawn(move || control::run(&control_config, handle));

    output.run().wrap_err("output loop failed")?;
    Ok(())
}

fn render(config: &EngineConfig, bars: u32, path: &Path) -> EyreResult<()> {
    let mut mixer = engine::build_offline(config).wrap_err("failed to build engine")?;

    // A bar is 16 steps of two clock halves each.
    let samples_per_step = mixer
        .tracks()
        .first()
        .and_then(|t| t.sequencer().clock())
        .map_or(0, |c| c.samples_per_step());
    let frames = samples_per_step * 2 * 16 * bars as usize;

    let pcm = mixer.render_frames(frames);
    mixer.stop();

    let mut out = BufWriter::new(
        File::create(path).wrap_err_with(|| format!("failed to create {}", path.display()))?,
    );
    write_wav(&mut out, &WavFormat::engine(), &pcm)?;

    info!(
        output = %path.display(),
        frames,
        seconds = frames as f64 / SAMPLE_RATE,
        "rendered"
    );
    Ok(())
}
