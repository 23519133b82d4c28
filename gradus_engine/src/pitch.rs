// Interval arithmetic over absolute chromatic pitch numbers.
//
// Everything here is a total function over integers: semitone distance,
// octave reduction to an interval class, and the two-voice consonance
// classification the species rules are built on. In strict two-voice
// writing the perfect fourth (class 5) counts as a dissonance, unlike the
// freer treatment it gets with more voices.

use serde::{Deserialize, Serialize};

/// Consonance classification of an interval class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalQuality {
    /// Unison/octave (class 0) and perfect fifth (class 7).
    PerfectConsonant,
    /// Thirds and sixths (classes 3, 4, 8, 9).
    ImperfectConsonant,
    /// Everything else, including the fourth and the tritone.
    Dissonant,
}

/// A harmonic interval between two simultaneous pitches. Derived, never
/// stored — recomputed per simultaneity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Absolute distance in semitones.
    pub semitones: i32,
    /// The distance reduced mod 12 (0-11).
    pub class_reduced: i32,
    pub quality: IntervalQuality,
}

impl Interval {
    pub fn is_perfect(self) -> bool {
        self.quality == IntervalQuality::PerfectConsonant
    }

    pub fn is_imperfect(self) -> bool {
        self.quality == IntervalQuality::ImperfectConsonant
    }

    pub fn is_dissonant(self) -> bool {
        self.quality == IntervalQuality::Dissonant
    }

    /// Human-readable name of the reduced class, for violation messages.
    pub fn class_name(self) -> &'static str {
        interval_class_name(self.class_reduced)
    }
}

/// Classify the harmonic interval between two pitches. Total over any two
/// integers; direction is ignored.
pub fn classify_interval(pitch_a: i32, pitch_b: i32) -> Interval {
    let semitones = (pitch_a - pitch_b).abs();
    let class_reduced = semitones % 12;
    let quality = match class_reduced {
        0 | 7 => IntervalQuality::PerfectConsonant,
        3 | 4 | 8 | 9 => IntervalQuality::ImperfectConsonant,
        _ => IntervalQuality::Dissonant,
    };
    Interval {
        semitones,
        class_reduced,
        quality,
    }
}

/// Name an interval class (0-11) for message text.
pub fn interval_class_name(class: i32) -> &'static str {
    match class.rem_euclid(12) {
        0 => "unison or octave",
        1 => "minor second",
        2 => "major second",
        3 => "minor third",
        4 => "major third",
        5 => "fourth",
        6 => "tritone",
        7 => "perfect fifth",
        8 => "minor sixth",
        9 => "major sixth",
        10 => "minor seventh",
        _ => "major seventh",
    }
}

/// A melodic step: within two semitones, but not a repeat.
pub fn is_step(delta: i32) -> bool {
    delta != 0 && delta.abs() <= 2
}

/// A melodic leap: any motion beyond the configured threshold (default a
/// major second, so thirds and larger count as leaps).
pub fn is_leap(delta: i32, leap_threshold: i32) -> bool {
    delta.abs() > leap_threshold
}

/// Compact note name for a MIDI pitch (e.g. "D4", "F#3"), for CLI output.
pub fn pitch_name(pitch: i32) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
    ];
    let pc = pitch.rem_euclid(12) as usize;
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", NAMES[pc], octave)
}
