//! Pattern generation.
//!
//! Everything here is a pure function of its inputs and an explicit random
//! source, so a seeded [`Pcg32`] reproduces the same patterns. The shape of the
//! output (weighted choices with drum-aware biasing) matters; the exact
//! distribution does not.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sequencing::pattern::{BasslinePattern, Lane, RhythmPattern, Step, STEPS};
use crate::voices::drum::{DrumKind, DRUM_COUNT};

/// Creates a PCG32 generator from a 32-bit seed.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Weighted random choice.
///
/// Returns `None` when `items` is empty or no weight is positive. Negative or
/// non-finite weights count as zero.
pub fn pick<T: Copy, R: Rng + ?Sized>(items: &[(T, f64)], rng: &mut R) -> Option<T> {
    let weights = items
        .iter()
        .map(|(_, w)| if w.is_finite() && *w > 0.0 { *w } else { 0.0 });
    let dist = WeightedIndex::new(weights).ok()?;
    Some(items[dist.sample(rng)].0)
}

/// Per-step hit probability for each drum: a plain four-on-the-floor shape.
pub fn step_weights(drum: DrumKind) -> [f64; STEPS] {
    const BD: [f64; STEPS] = [
        0.95, 0.05, 0.15, 0.05, 0.85, 0.05, 0.2, 0.1, 0.9, 0.05, 0.25, 0.05, 0.8, 0.1, 0.2, 0.15,
    ];
    const SD: [f64; STEPS] = [
        0.0, 0.02, 0.05, 0.05, 0.9, 0.05, 0.05, 0.15, 0.0, 0.1, 0.05, 0.1, 0.9, 0.1, 0.15, 0.25,
    ];
    const CH: [f64; STEPS] = [
        0.3, 0.2, 0.85, 0.2, 0.3, 0.2, 0.85, 0.2, 0.3, 0.2, 0.85, 0.2, 0.3, 0.2, 0.85, 0.3,
    ];
    const OH: [f64; STEPS] = [
        0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.4, 0.05,
    ];
    const CP: [f64; STEPS] = [
        0.0, 0.0, 0.0, 0.05, 0.3, 0.0, 0.0, 0.05, 0.0, 0.0, 0.0, 0.05, 0.3, 0.0, 0.1, 0.05,
    ];
    const TOM: [f64; STEPS] = [
        0.0, 0.0, 0.05, 0.05, 0.0, 0.0, 0.05, 0.1, 0.0, 0.0, 0.05, 0.05, 0.0, 0.1, 0.15, 0.2,
    ];
    const CY: [f64; STEPS] = [
        0.15, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ];

    match drum {
        DrumKind::BassDrum => BD,
        DrumKind::SnareDrum => SD,
        DrumKind::ClosedHat => CH,
        DrumKind::OpenHat => OH,
        DrumKind::Clap => CP,
        DrumKind::LowTom | DrumKind::HighTom => TOM,
        DrumKind::Crash => CY,
    }
}

/// Small edits applied to one drum lane of a rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syncopation {
    /// Add a hit on an empty step.
    Add,
    /// Accent a step that already has a hit.
    Accent,
    /// Drop a hit, preferring weak steps.
    Remove,
    /// Shift a hit one step earlier or later.
    Move,
}

impl Syncopation {
    pub const ALL: [Syncopation; 4] = [
        Syncopation::Add,
        Syncopation::Accent,
        Syncopation::Remove,
        Syncopation::Move,
    ];

    /// Apply this edit to `drum`'s lane. Returns the pattern unchanged when the
    /// edit has nothing to work on.
    pub fn apply<R: Rng + ?Sized>(
        self,
        pattern: &RhythmPattern,
        drum: DrumKind,
        weights: &[f64; STEPS],
        rng: &mut R,
    ) -> RhythmPattern {
        let mut out = *pattern;
        let lane = *pattern.lane(drum);

        match self {
            Syncopation::Add => {
                let empty = candidates(&lane, false, |i| weights[i]);
                if let Some(step) = pick(&empty, rng) {
                    out.set(drum, step, true);
                }
            }
            Syncopation::Accent => {
                let hits = candidates(&lane, true, |i| weights[i] + 0.05);
                if let Some(step) = pick(&hits, rng) {
                    out.accents[step] = true;
                }
            }
            Syncopation::Remove => {
                let hits = candidates(&lane, true, |i| 1.0 / (1.0 + 4.0 * weights[i]));
                if let Some(step) = pick(&hits, rng) {
                    out.set(drum, step, false);
                }
            }
            Syncopation::Move => {
                let movable: Vec<(usize, f64)> = (0..STEPS)
                    .filter(|&i| lane[i] && (!lane[prev(i)] || !lane[next(i)]))
                    .map(|i| (i, 1.0))
                    .collect();
                if let Some(from) = pick(&movable, rng) {
                    let targets: Vec<(usize, f64)> = [prev(from), next(from)]
                        .into_iter()
                        .filter(|&i| !lane[i])
                        .map(|i| (i, weights[i] + 0.05))
                        .collect();
                    if let Some(to) = pick(&targets, rng) {
                        out.set(drum, from, false);
                        out.set(drum, to, true);
                    }
                }
            }
        }
        out
    }
}

fn prev(step: usize) -> usize {
    (step + STEPS - 1) % STEPS
}

fn next(step: usize) -> usize {
    (step + 1) % STEPS
}

fn candidates(lane: &Lane, hit: bool, weight: impl Fn(usize) -> f64) -> Vec<(usize, f64)> {
    (0..STEPS)
        .filter(|&i| lane[i] == hit)
        .map(|i| (i, weight(i)))
        .collect()
}

/// Roll a fresh rhythm from the per-drum step weights.
pub fn create_rhythm<R: Rng + ?Sized>(rng: &mut R) -> RhythmPattern {
    let mut pattern = RhythmPattern::new();
    for drum in DrumKind::ALL {
        let weights = step_weights(drum);
        for (step, w) in weights.iter().enumerate() {
            pattern.set(drum, step, rng.gen_bool(w.clamp(0.0, 1.0)));
        }
    }
    pattern.set(DrumKind::BassDrum, 0, true);

    // Closed and open hat never share a step.
    for step in 0..STEPS {
        if pattern.is_hit(DrumKind::OpenHat, step) {
            pattern.set(DrumKind::ClosedHat, step, false);
        }
    }

    for step in (0..STEPS).step_by(4) {
        pattern.accents[step] = rng.gen_bool(0.35);
    }
    pattern
}

/// Apply one to four random syncopations to an existing rhythm.
pub fn randomize_rhythm<R: Rng + ?Sized>(pattern: &RhythmPattern, rng: &mut R) -> RhythmPattern {
    const EDITS: [(Syncopation, f64); 4] = [
        (Syncopation::Add, 3.0),
        (Syncopation::Accent, 2.0),
        (Syncopation::Remove, 2.0),
        (Syncopation::Move, 3.0),
    ];
    const DRUMS: [(DrumKind, f64); DRUM_COUNT] = [
        (DrumKind::BassDrum, 3.0),
        (DrumKind::SnareDrum, 3.0),
        (DrumKind::ClosedHat, 3.0),
        (DrumKind::OpenHat, 1.5),
        (DrumKind::Clap, 1.0),
        (DrumKind::LowTom, 0.5),
        (DrumKind::HighTom, 0.5),
        (DrumKind::Crash, 0.25),
    ];

    let mut out = *pattern;
    for _ in 0..rng.gen_range(1..=4) {
        let (Some(edit), Some(drum)) = (pick(&EDITS, rng), pick(&DRUMS, rng)) else {
            continue;
        };
        out = edit.apply(&out, drum, &step_weights(drum), rng);
    }
    out
}

/// How the bassline should line up against the drums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasslinePrefs {
    /// Favour steps where the bass drum hits; otherwise avoid them.
    pub prefer_bass_drum: bool,
    /// Favour steps where the snare hits; otherwise avoid them.
    pub prefer_snare_drum: bool,
}

/// Semitone offsets and their weights: a minor-pentatonic flavour.
const INTERVALS: [(u8, f64); 7] = [
    (0, 6.0),
    (12, 2.5),
    (3, 2.0),
    (5, 1.0),
    (7, 2.5),
    (10, 1.5),
    (1, 0.3),
];

const OCTAVES: [(i8, f64); 3] = [(0, 8.0), (1, 1.5), (-1, 1.0)];

fn roll_pitch<R: Rng + ?Sized>(step: &mut Step, rng: &mut R) {
    step.note = pick(&INTERVALS, rng).unwrap_or(0);
    let octave = pick(&OCTAVES, rng).unwrap_or(0);
    step.up = octave > 0;
    step.down = octave < 0;
}

fn collision_bias(hit: bool, prefer: bool) -> f64 {
    match (hit, prefer) {
        (false, _) => 1.0,
        (true, true) => 1.8,
        (true, false) => 0.35,
    }
}

/// Roll a bassline that follows or dodges the given drums.
pub fn create_bassline<R: Rng + ?Sized>(
    rng: &mut R,
    rhythm: &RhythmPattern,
    prefs: BasslinePrefs,
    base_note: u8,
) -> BasslinePattern {
    let mut pattern = BasslinePattern::new(base_note);

    for (i, step) in pattern.steps.iter_mut().enumerate() {
        let mut p = if i % 2 == 0 { 0.6 } else { 0.4 };
        p *= collision_bias(rhythm.is_hit(DrumKind::BassDrum, i), prefs.prefer_bass_drum);
        p *= collision_bias(rhythm.is_hit(DrumKind::SnareDrum, i), prefs.prefer_snare_drum);

        *step = Step::rest();
        if rng.gen_bool(p.clamp(0.0, 0.95)) {
            step.pause = false;
            roll_pitch(step, rng);
            step.accent = rng.gen_bool(0.2);
            step.slide = rng.gen_bool(0.15);
        }
    }

    if pattern.note_count() == 0 {
        pattern.steps[0] = Step::note(0);
    }
    pattern
}

/// Re-roll the notes of a bassline while keeping its rhythm, accents and slides.
pub fn randomize_sequence<R: Rng + ?Sized>(
    pattern: &BasslinePattern,
    rng: &mut R,
) -> BasslinePattern {
    let mut out = *pattern;
    for step in out.steps.iter_mut().filter(|s| !s.pause) {
        roll_pitch(step, rng);
    }
    out
}
