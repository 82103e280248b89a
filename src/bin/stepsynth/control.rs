//! Line-based control from stdin, running beside the output loop.

use std::io::{self, BufRead};

use rand_pcg::Pcg32;
use tracing::{info, warn};

use stepsynth::engine::{self, EngineConfig, EngineHandle, TRACK_BASS, TRACK_DRUMS};
use stepsynth::sequencing::generate::create_rng;
use stepsynth::sequencing::{
    create_bassline, create_rhythm, randomize_rhythm, randomize_sequence, BasslinePattern,
    BasslinePrefs, RhythmPattern,
};
use stepsynth::synth::{EffectChange, EngineMessage};

pub const HELP: &str = "\
commands:
  n            new patterns
  r            vary the drums      b  re-roll the bass notes
  t <bpm>      tempo               v <0..1>  master volume
  cc <track> <controller> <value>
  f            toggle reverb freeze
  s            silence (notes off, flush effects)
  q            quit";

/// Mirror of the patterns the engine is playing, so edits build on them.
struct Session {
    rng: Pcg32,
    prefs: BasslinePrefs,
    base_note: u8,
    bassline: BasslinePattern,
    rhythm: RhythmPattern,
    frozen: bool,
}

impl Session {
    fn new(config: &EngineConfig) -> Self {
        let (bassline, rhythm) = engine::initial_patterns(config);
        Self {
            rng: create_rng(config.seed.wrapping_add(1)),
            prefs: config.bassline_prefs(),
            base_note: config.bass_note,
            bassline,
            rhythm,
            frozen: false,
        }
    }

    fn messages(&mut self, line: &str) -> Result<Vec<EngineMessage>, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Vec::new());
        };
        let mut arg = |name: &str| {
            words
                .next()
                .ok_or_else(|| format!("missing {name}"))
                .and_then(|w| w.parse::<f64>().map_err(|e| format!("{name}: {e}")))
        };

        let messages = match command {
            "n" => {
                self.rhythm = create_rhythm(&mut self.rng);
                self.bassline =
                    create_bassline(&mut self.rng, &self.rhythm, self.prefs, self.base_note);
                vec![self.set_rhythm(), self.set_bassline()]
            }
            "r" => {
                self.rhythm = randomize_rhythm(&self.rhythm, &mut self.rng);
                vec![self.set_rhythm()]
            }
            "b" => {
                self.bassline = randomize_sequence(&self.bassline, &mut self.rng);
                vec![self.set_bassline()]
            }
            "t" => vec![EngineMessage::SetTempo { bpm: arg("bpm")? }],
            "cc" => {
                let track = arg("track")? as usize;
                let controller = arg("controller")?;
                let value = arg("value")?;
                if !(0.0..=127.0).contains(&controller) || !(0.0..=127.0).contains(&value) {
                    return Err("controller and value must be 0..=127".into());
                }
                vec![EngineMessage::ControlChange {
                    track,
                    controller: controller as u8,
                    value: value as u8,
                }]
            }
            "f" => {
                self.frozen = !self.frozen;
                let mode = if self.frozen { 1.0 } else { 0.0 };
                vec![EngineMessage::Effect(EffectChange::ReverbMode(mode))]
            }
            "s" => vec![EngineMessage::Stop],
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(messages)
    }

    fn set_bassline(&self) -> EngineMessage {
        EngineMessage::SetBassline {
            track: TRACK_BASS,
            pattern: self.bassline,
        }
    }

    fn set_rhythm(&self) -> EngineMessage {
        EngineMessage::SetRhythm {
            track: TRACK_DRUMS,
            pattern: self.rhythm,
        }
    }
}

/// Read commands until `q` or end of input, then stop the engine.
pub fn run(config: &EngineConfig, mut handle: EngineHandle) {
    let mut session = Session::new(config);
    eprintln!("{HELP}");

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();

        if line == "q" {
            break;
        }
        if let Some(volume) = line.strip_prefix("v ") {
            match volume.trim().parse::<f64>() {
                Ok(v) => handle.params().set_master_volume(v),
                Err(e) => warn!("volume: {e}"),
            }
            continue;
        }

        match session.messages(line) {
            Ok(messages) => {
                for message in messages {
                    if let Err(e) = handle.send(message) {
                        warn!(%e, "control message dropped");
                    }
                }
            }
            Err(e) => warn!("{e}"),
        }
    }

    info!(
        rejected_events = handle.stats().rejected_events(),
        underrun_frames = handle.stats().underrun_frames(),
        "stopping"
    );
    handle.stop();
}
