// Chord and progression drills.
//
// The trainer's non-counterpoint modes quiz chord spelling and short
// diatonic progressions. Chords are interval stacks over a root; diatonic
// progressions are realized by stacking scale thirds in a mode, so the
// triad qualities fall out of the scale rather than being listed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mode::ModeInstance;

/// Chord qualities the drills quiz, as semitone stacks over the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Major7,
    Minor7,
    HalfDiminished7,
}

impl ChordQuality {
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Dominant7 => "dominant seventh",
            ChordQuality::Major7 => "major seventh",
            ChordQuality::Minor7 => "minor seventh",
            ChordQuality::HalfDiminished7 => "half-diminished seventh",
        }
    }
}

/// One chord drill: a root and a quality to spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: i32,
    pub quality: ChordQuality,
}

impl Chord {
    pub fn pitches(&self) -> Vec<i32> {
        self.quality
            .intervals()
            .iter()
            .map(|&iv| self.root + iv)
            .collect()
    }
}

/// Quality frequency table: triads dominate, sevenths are the harder cards,
/// the augmented triad is the rare one.
const QUALITY_TABLE: &[(ChordQuality, u32)] = &[
    (ChordQuality::Major, 24),
    (ChordQuality::Minor, 24),
    (ChordQuality::Diminished, 10),
    (ChordQuality::Dominant7, 14),
    (ChordQuality::Minor7, 10),
    (ChordQuality::Major7, 8),
    (ChordQuality::HalfDiminished7, 6),
    (ChordQuality::Augmented, 4),
];

/// Draw a random chord with its root in `[low, high]`.
pub fn random_chord(low: i32, high: i32, rng: &mut impl Rng) -> Chord {
    let total: u32 = QUALITY_TABLE.iter().map(|&(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    let mut quality = ChordQuality::Major;
    for &(q, weight) in QUALITY_TABLE {
        if roll < weight {
            quality = q;
            break;
        }
        roll -= weight;
    }
    Chord {
        root: rng.random_range(low..=high),
        quality,
    }
}

/// One step of a progression drill: a scale degree and its diatonic triad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeTriad {
    /// Scale degree of the root, 0-6.
    pub degree: i32,
    pub pitches: [i32; 3],
}

/// Degree sequences for progression drills, final-degree cadences included.
const PROGRESSIONS: &[&[i32]] = &[
    &[0, 3, 4, 0],
    &[0, 5, 3, 4, 0],
    &[0, 2, 3, 4, 0],
    &[0, 3, 1, 4, 0],
    &[0, 4, 5, 3, 4, 0],
];

/// Diatonic triad on a scale degree: root, third, fifth stacked in mode.
pub fn diatonic_triad(mode: &ModeInstance, octave: i32, degree: i32) -> DegreeTriad {
    DegreeTriad {
        degree: degree.rem_euclid(7),
        pitches: [
            mode.degree_pitch(octave, degree),
            mode.degree_pitch(octave, degree + 2),
            mode.degree_pitch(octave, degree + 4),
        ],
    }
}

/// Draw a random diatonic progression realized in the given mode.
pub fn random_progression(
    mode: &ModeInstance,
    octave: i32,
    rng: &mut impl Rng,
) -> Vec<DegreeTriad> {
    let template = PROGRESSIONS[rng.random_range(0..PROGRESSIONS.len())];
    template
        .iter()
        .map(|&degree| diatonic_triad(mode, octave, degree))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_chord_spelling() {
        let chord = Chord {
            root: 62,
            quality: ChordQuality::Minor7,
        };
        assert_eq!(chord.pitches(), vec![62, 65, 69, 72]); // D F A C
    }

    #[test]
    fn test_random_chord_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let chord = random_chord(48, 72, &mut rng);
            assert!((48..=72).contains(&chord.root));
            assert!(!chord.pitches().is_empty());
        }
    }

    #[test]
    fn test_dorian_tonic_triad_is_minor() {
        // D Dorian degree 0 stacks D-F-A.
        let triad = diatonic_triad(&ModeInstance::d_dorian(), 4, 0);
        assert_eq!(triad.pitches, [62, 65, 69]);
    }

    #[test]
    fn test_progressions_start_and_end_on_the_final() {
        let mode = ModeInstance::d_dorian();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10 {
            let prog = random_progression(&mode, 4, &mut rng);
            assert_eq!(prog.first().unwrap().degree, 0);
            assert_eq!(prog.last().unwrap().degree, 0);
            for triad in &prog {
                for &p in &triad.pitches {
                    assert!(mode.is_in_mode(p), "pitch {p} out of mode");
                }
            }
        }
    }
}
