use stepsynth::engine::{self, EngineConfig, OutputLoop};
use stepsynth::io::{wrap_raw_pcm, MemorySink, RawCapture};

#[test]
fn captured_stream_wraps_into_playable_wav() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("session.raw");
    let wav = dir.path().join("session.wav");

    let mixer = engine::build_offline(&EngineConfig::default()).unwrap();
    let capture = RawCapture::create(&raw).unwrap();
    let mut output = OutputLoop::new(mixer, MemorySink::new(), 2048).with_capture(capture);
    output.run_buffers(3).unwrap();
    let (_, sink) = output.into_parts();

    let written = wrap_raw_pcm(&raw, &wav).unwrap();
    let bytes = std::fs::read(&wav).unwrap();
    assert_eq!(written, 3 * 2048);
    assert_eq!(bytes.len(), 44 + 3 * 2048);
    assert_eq!(&bytes[44..], sink.data());
}

#[test]
fn wrapping_a_missing_capture_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = wrap_raw_pcm(dir.path().join("none.raw"), dir.path().join("out.wav"));
    assert!(result.is_err());
}
