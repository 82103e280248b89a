#![cfg(feature = "rtrb")]

use std::sync::Arc;

use rtrb::RingBuffer;
use stepsynth::engine::{self, EngineConfig, Mixer, OutputLoop, Track, TRACK_BASS};
use stepsynth::io::{midi_to_message, write_wav, MemorySink, MidiEvent, WavFormat};
use stepsynth::sequencing::Sequencer;
use stepsynth::synth::{EngineMessage, EngineStats, SharedParams};
use stepsynth::voices::AcidVoice;
use stepsynth::EngineContext;

/// One bar at 120 bpm: 16 steps of two 2756-sample halves.
const BAR_FRAMES: usize = 16 * 2 * 2756;

fn samples(pcm: &[u8]) -> Vec<i16> {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

#[test]
fn default_engine_plays_a_bar() {
    let mut mixer = engine::build_offline(&EngineConfig::default()).unwrap();
    let pcm = mixer.render_frames(BAR_FRAMES);
    assert_eq!(pcm.len(), BAR_FRAMES * 4);

    let s = samples(&pcm);
    assert!(s.iter().any(|&x| x != 0));

    let clock = mixer.tracks()[TRACK_BASS].sequencer().clock().unwrap();
    assert_eq!(clock.samples_per_step(), 2756);
    assert_eq!(clock.bars(), 1);
    assert_eq!(clock.step(), 0);
}

#[test]
fn renders_are_deterministic_per_seed() {
    let render = |seed| {
        let config = EngineConfig {
            seed,
            ..Default::default()
        };
        engine::build_offline(&config)
            .unwrap()
            .render_frames(BAR_FRAMES)
    };
    assert_eq!(render(5), render(5));
    assert_ne!(render(5), render(6));
}

#[test]
fn lowest_bass_note_never_faults_the_bassline() {
    for seed in 0..20 {
        let config = EngineConfig {
            bass_note: engine::MIN_BASS_NOTE,
            seed,
            ..Default::default()
        };
        config.validate().unwrap();
        let mut mixer = engine::build_offline(&config).unwrap();
        mixer.render_frames(2 * BAR_FRAMES);
        assert_eq!(mixer.stats().rejected_events(), 0, "seed {seed}");
    }
}

#[test]
fn master_volume_bounds_the_output() {
    let config = EngineConfig {
        master_volume: 0.25,
        ..Default::default()
    };
    let mut mixer = engine::build_offline(&config).unwrap();
    let limit = (0.25 * i16::MAX as f64) as i16;
    assert!(samples(&mixer.render_frames(BAR_FRAMES))
        .iter()
        .all(|&x| x.abs() <= limit));
}

#[test]
fn wav_render_has_exact_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bar.wav");

    let mut mixer = engine::build_offline(&EngineConfig::default()).unwrap();
    let pcm = mixer.render_frames(1000);
    let mut file = std::fs::File::create(&path).unwrap();
    write_wav(&mut file, &WavFormat::engine(), &pcm).unwrap();
    drop(file);

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 44 + 4000);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 4000);
    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 4000);
    assert_eq!(&bytes[44..], &pcm[..]);
}

/// A mixer with one acid voice that only plays what it is sent.
fn manual_mixer() -> (Mixer, rtrb::Producer<EngineMessage>) {
    let ctx = EngineContext::default();
    let config = EngineConfig::default();
    let (producer, consumer) = RingBuffer::new(16);
    let mut mixer = Mixer::new(
        &ctx,
        &config,
        Box::new(consumer),
        Arc::new(SharedParams::new(1.0)),
        Arc::new(EngineStats::default()),
    );
    mixer.add_track(Track::new(
        "acid",
        Sequencer::Manual,
        AcidVoice::new(&ctx).unwrap(),
    ));
    (mixer, producer)
}

#[test]
fn midi_note_sounds_until_stop() {
    let (mut mixer, mut producer) = manual_mixer();
    assert!(samples(&mixer.render_frames(512)).iter().all(|&x| x == 0));

    let event = MidiEvent::parse(&[0x90, 45, 100]).unwrap();
    producer.push(midi_to_message(event, 1).unwrap()).unwrap();
    assert!(samples(&mixer.render_frames(4096)).iter().any(|&x| x != 0));

    producer.push(EngineMessage::Stop).unwrap();
    assert!(samples(&mixer.render_frames(512)).iter().all(|&x| x == 0));
}

#[test]
fn bad_events_are_counted_not_fatal() {
    let (mut mixer, mut producer) = manual_mixer();
    producer
        .push(EngineMessage::NoteOn {
            track: 0,
            note: 200,
            velocity: 100,
        })
        .unwrap();
    producer
        .push(EngineMessage::NoteOn {
            track: 9,
            note: 40,
            velocity: 100,
        })
        .unwrap();
    mixer.render_frames(64);
    assert_eq!(mixer.stats().rejected_events(), 2);
}

#[test]
fn output_loop_stops_on_request() {
    let (mixer, handle) = engine::build(&EngineConfig::default()).unwrap();
    let mut output = OutputLoop::new(mixer, MemorySink::new(), 1024);
    output.run_buffers(2).unwrap();
    handle.stop();
    output.run().unwrap();

    let (mixer, sink) = output.into_parts();
    assert_eq!(sink.writes(), 2);
    assert_eq!(mixer.stats().buffers_rendered(), 2);
}
