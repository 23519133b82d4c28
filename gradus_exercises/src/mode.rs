// Church-mode support for exercise generation.
//
// Species exercises live in the church modes, not major/minor tonality.
// A `ModeInstance` pins a mode pattern to a final, and everything else —
// scale membership, degree arithmetic, cadence neighbors — is derived from
// the interval pattern. Pitches are the same absolute chromatic numbers
// the engine validates.

use serde::{Deserialize, Serialize};

/// The six modes used for exercises, defined by their interval pattern
/// above the final.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// D E F G A B C
    Dorian,
    /// E F G A B C D — the characteristic half-step above the final.
    Phrygian,
    /// F G A B C D E
    Lydian,
    /// G A B C D E F
    Mixolydian,
    /// A B C D E F G
    Aeolian,
    /// C D E F G A B
    Ionian,
}

impl Mode {
    /// Semitone offsets of the seven scale degrees above the final.
    pub fn intervals(self) -> [i32; 7] {
        match self {
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => [0, 2, 3, 5, 7, 8, 10],
            Mode::Ionian => [0, 2, 4, 5, 7, 9, 11],
        }
    }

    /// Parse a mode name as the CLI spells it.
    pub fn from_name(name: &str) -> Option<Mode> {
        match name.to_lowercase().as_str() {
            "dorian" => Some(Mode::Dorian),
            "phrygian" => Some(Mode::Phrygian),
            "lydian" => Some(Mode::Lydian),
            "mixolydian" => Some(Mode::Mixolydian),
            "aeolian" => Some(Mode::Aeolian),
            "ionian" => Some(Mode::Ionian),
            _ => None,
        }
    }
}

/// A mode pinned to a final pitch class (0 = C, 2 = D, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInstance {
    pub mode: Mode,
    pub final_pc: i32,
}

impl ModeInstance {
    pub fn new(mode: Mode, final_pc: i32) -> Self {
        ModeInstance {
            mode,
            final_pc: final_pc.rem_euclid(12),
        }
    }

    /// D Dorian, the workhorse mode of the species exercises.
    pub fn d_dorian() -> Self {
        ModeInstance::new(Mode::Dorian, 2)
    }

    /// The conventional (mode, final) pairings.
    pub fn common() -> &'static [(Mode, i32)] {
        &[
            (Mode::Dorian, 2),
            (Mode::Phrygian, 4),
            (Mode::Lydian, 5),
            (Mode::Mixolydian, 7),
            (Mode::Aeolian, 9),
            (Mode::Ionian, 0),
        ]
    }

    pub fn is_in_mode(&self, pitch: i32) -> bool {
        let pc = (pitch - self.final_pc).rem_euclid(12);
        self.mode.intervals().contains(&pc)
    }

    /// The final in a given octave (octave 4 puts a D final at D4 = 62).
    pub fn final_in_octave(&self, octave: i32) -> i32 {
        (octave + 1) * 12 + self.final_pc
    }

    /// Pitch of an absolute scale degree relative to the final in `octave`.
    /// Degree 0 is the final itself; degree 7 the final an octave up;
    /// negative degrees walk below.
    pub fn degree_pitch(&self, octave: i32, degree: i32) -> i32 {
        let intervals = self.mode.intervals();
        let base = self.final_in_octave(octave);
        let idx = degree.rem_euclid(7) as usize;
        base + 12 * degree.div_euclid(7) + intervals[idx]
    }

    /// Scale degree of a pitch within its octave (0-6), or None when the
    /// pitch is out of mode.
    pub fn scale_degree(&self, pitch: i32) -> Option<i32> {
        let pc = (pitch - self.final_pc).rem_euclid(12);
        self.mode
            .intervals()
            .iter()
            .position(|&iv| iv == pc)
            .map(|d| d as i32)
    }

    /// The two stepwise cadence approaches to a final: the degree above and
    /// the degree below (the subsemitone).
    pub fn cadence_neighbors(&self, final_pitch: i32) -> [i32; 2] {
        let octave = final_pitch.div_euclid(12) - 1;
        debug_assert_eq!(self.final_in_octave(octave), final_pitch);
        [
            self.degree_pitch(octave, 1),
            self.degree_pitch(octave, -1),
        ]
    }

    /// Every in-mode pitch in an inclusive range, ascending.
    pub fn pitches_in_range(&self, low: i32, high: i32) -> Vec<i32> {
        (low..=high).filter(|&p| self.is_in_mode(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d_dorian_membership() {
        let mode = ModeInstance::d_dorian();
        for pitch in [62, 64, 65, 67, 69, 71, 72, 74] {
            assert!(mode.is_in_mode(pitch), "pitch {pitch} should be in D Dorian");
        }
        assert!(!mode.is_in_mode(63)); // Eb
        assert!(!mode.is_in_mode(66)); // F#
    }

    #[test]
    fn test_degree_pitch_walks_octaves() {
        let mode = ModeInstance::d_dorian();
        assert_eq!(mode.final_in_octave(4), 62);
        assert_eq!(mode.degree_pitch(4, 0), 62); // D4
        assert_eq!(mode.degree_pitch(4, 4), 69); // A4
        assert_eq!(mode.degree_pitch(4, 7), 74); // D5
        assert_eq!(mode.degree_pitch(4, -1), 60); // C4
        assert_eq!(mode.degree_pitch(4, -7), 50); // D3
    }

    #[test]
    fn test_scale_degree_round_trip() {
        let mode = ModeInstance::new(Mode::Mixolydian, 7);
        for degree in 0..7 {
            let pitch = mode.degree_pitch(4, degree);
            assert_eq!(mode.scale_degree(pitch), Some(degree), "degree {degree}");
        }
        assert_eq!(mode.scale_degree(68), None); // Ab not in G Mixolydian
    }

    #[test]
    fn test_phrygian_cadence_neighbors() {
        // E Phrygian: the upper neighbor is the half-step F.
        let mode = ModeInstance::new(Mode::Phrygian, 4);
        let [above, below] = mode.cadence_neighbors(64);
        assert_eq!(above, 65); // F4
        assert_eq!(below, 62); // D4
    }
}
