//! Tracks, the mixer and the output loop, plus the builders that wire the
//! default two-track setup together.
//!
//! ```ignore
//! use stepsynth::engine::{self, EngineConfig, OutputLoop};
//! use stepsynth::io::MemorySink;
//!
//! let config = EngineConfig::default();
//! let (mixer, handle) = engine::build(&config)?;
//! handle.send(EngineMessage::SetTempo { bpm: 128.0 })?;
//! OutputLoop::new(mixer, MemorySink::new(), config.buffer_bytes).run_buffers(8)?;
//! ```

pub mod config;
pub mod mixer;
pub mod output;
pub mod track;

use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Producer, RingBuffer};
use tracing::info;

pub use config::{EngineConfig, MixMode, MAX_BASS_NOTE, MIN_BASS_NOTE};
pub use mixer::Mixer;
pub use output::OutputLoop;
pub use track::Track;

use crate::io::loader::SampleBank;
use crate::sequencing::generate::{create_bassline, create_rhythm, create_rng};
use crate::sequencing::pattern::{BasslinePattern, RhythmPattern};
use crate::sequencing::sequencer::{BasslineSequencer, RhythmSequencer, Sequencer};
use crate::synth::message::{MessageReceiver, NoMessages};
use crate::synth::{EngineMessage, EngineStats, SharedParams};
use crate::voices::{AcidVoice, DrumKind, RhythmVoice};
use crate::{EngineContext, SynthError, SynthResult};

/// Index of the acid bassline track in a mixer built here.
pub const TRACK_BASS: usize = 0;
/// Index of the drum machine track in a mixer built here.
pub const TRACK_DRUMS: usize = 1;

/// The patterns the default tracks start with. Deterministic in `config.seed`.
pub fn initial_patterns(config: &EngineConfig) -> (BasslinePattern, RhythmPattern) {
    let mut rng = create_rng(config.seed);
    let rhythm = create_rhythm(&mut rng);
    let bassline = create_bassline(&mut rng, &rhythm, config.bassline_prefs(), config.bass_note);
    (bassline, rhythm)
}

/// The bassline and drum tracks, playing [`initial_patterns`].
pub fn build_tracks(
    ctx: &EngineContext,
    config: &EngineConfig,
    bank: Option<&SampleBank>,
) -> SynthResult<Vec<Track>> {
    let (bassline, rhythm) = initial_patterns(config);

    let bass = Track::new(
        "bass",
        Sequencer::Bassline(BasslineSequencer::new(ctx, config.bpm, bassline)?),
        AcidVoice::new(ctx)?,
    );
    let drums = Track::new(
        "drums",
        Sequencer::Rhythm(RhythmSequencer::new(ctx, config.bpm, rhythm)?),
        RhythmVoice::with_bank(ctx, bank)?,
    );
    Ok(vec![bass, drums])
}

/// Drum samples named after each [`DrumKind`], if a directory is configured.
pub fn load_samples(config: &EngineConfig) -> SynthResult<Option<SampleBank>> {
    let Some(dir) = config.samples_dir.as_ref() else {
        return Ok(None);
    };
    let names: Vec<&str> = DrumKind::ALL.iter().map(|k| k.sample_name()).collect();
    SampleBank::load_dir(dir, &names).map(Some)
}

/// A mixer with the default tracks that reads control messages from
/// `receiver`.
pub fn build_with_receiver(
    config: &EngineConfig,
    receiver: Box<dyn MessageReceiver + Send>,
) -> SynthResult<Mixer> {
    config.validate()?;
    let ctx = EngineContext::default();
    let bank = load_samples(config)?;

    let mut mixer = Mixer::new(
        &ctx,
        config,
        receiver,
        Arc::new(SharedParams::new(config.master_volume)),
        Arc::new(EngineStats::default()),
    );
    for track in build_tracks(&ctx, config, bank.as_ref())? {
        mixer.add_track(track);
    }

    info!(
        bpm = config.bpm,
        seed = config.seed,
        mix_mode = ?config.mix_mode,
        sampled_drums = bank.as_ref().map_or(0, SampleBank::len),
        "engine built"
    );
    Ok(mixer)
}

/// A mixer with no control input, for offline rendering.
pub fn build_offline(config: &EngineConfig) -> SynthResult<Mixer> {
    build_with_receiver(config, Box::new(NoMessages))
}

/// A mixer plus the handle the control thread uses to steer it.
#[cfg(feature = "rtrb")]
pub fn build(config: &EngineConfig) -> SynthResult<(Mixer, EngineHandle)> {
    let (producer, consumer) = RingBuffer::<EngineMessage>::new(config.queue_capacity);
    let mixer = build_with_receiver(config, Box::new(consumer))?;
    let handle = EngineHandle {
        producer,
        params: Arc::clone(mixer.params()),
        stats: Arc::clone(mixer.stats()),
    };
    Ok((mixer, handle))
}

/// Control-side end of the engine: queues messages and shares the atomics.
#[cfg(feature = "rtrb")]
pub struct EngineHandle {
    producer: Producer<EngineMessage>,
    params: Arc<SharedParams>,
    stats: Arc<EngineStats>,
}

#[cfg(feature = "rtrb")]
impl EngineHandle {
    /// Queue a message for the next buffer. Fails when the queue is full.
    pub fn send(&mut self, message: EngineMessage) -> SynthResult<()> {
        self.producer.push(message).map_err(|_| {
            SynthError::configuration("queue", "control queue is full, message dropped")
        })
    }

    pub fn params(&self) -> &Arc<SharedParams> {
        &self.params
    }

    pub fn stats(&self) -> &Arc<EngineStats> {
        &self.stats
    }

    /// Ask the output loop to stop after the current buffer.
    pub fn stop(&self) {
        self.params.request_stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::STEPS;

    fn config() -> EngineConfig {
        EngineConfig {
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn default_tracks_are_bass_then_drums() {
        let tracks = build_tracks(&EngineContext::default(), &config(), None).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[TRACK_BASS].name, "bass");
        assert_eq!(tracks[TRACK_DRUMS].name, "drums");
        assert!(matches!(tracks[TRACK_BASS].sequencer(), Sequencer::Bassline(_)));
        assert!(matches!(tracks[TRACK_DRUMS].sequencer(), Sequencer::Rhythm(_)));
    }

    #[test]
    fn same_seed_same_patterns() {
        let ctx = EngineContext::default();
        let a = build_tracks(&ctx, &config(), None).unwrap();
        let b = build_tracks(&ctx, &config(), None).unwrap();
        let (Sequencer::Bassline(x), Sequencer::Bassline(y)) =
            (a[TRACK_BASS].sequencer(), b[TRACK_BASS].sequencer())
        else {
            panic!("bass track lost its sequencer");
        };
        for i in 0..STEPS {
            assert_eq!(x.pattern().step(i), y.pattern().step(i));
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = EngineConfig {
            bpm: 1000.0,
            ..Default::default()
        };
        assert!(matches!(
            build_offline(&bad),
            Err(SynthError::Configuration { .. })
        ));
    }

    #[test]
    fn missing_sample_dir_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig {
            samples_dir: Some(dir.path().join("nope")),
            ..Default::default()
        };
        assert!(matches!(
            build_offline(&cfg),
            Err(SynthError::ResourceLoad { .. })
        ));
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn handle_messages_reach_the_mixer() {
        let (mut mixer, mut handle) = build(&config()).unwrap();
        handle
            .send(EngineMessage::SetTempo { bpm: 150.0 })
            .unwrap();
        mixer.render_frames(1);
        let clock = mixer.tracks()[TRACK_BASS].sequencer().clock().unwrap();
        assert_eq!(clock.bpm(), 150.0);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn full_queue_reports_an_error() {
        let cfg = EngineConfig {
            queue_capacity: 2,
            ..config()
        };
        let (_mixer, mut handle) = build(&cfg).unwrap();
        handle.send(EngineMessage::AllNotesOff).unwrap();
        handle.send(EngineMessage::AllNotesOff).unwrap();
        assert!(handle.send(EngineMessage::AllNotesOff).is_err());
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn stop_clears_running_flag() {
        let (mixer, handle) = build(&config()).unwrap();
        handle.stop();
        assert!(!mixer.params().is_running());
    }
}
