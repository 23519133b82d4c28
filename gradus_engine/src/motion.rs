// Relative-motion classifier for two voices.
//
// Given two adjacent simultaneities (four pitches), classifies how the
// voices moved relative to each other. Pure and stateless; invoked once per
// adjacent pair of simultaneities during the validation pass.

use serde::{Deserialize, Serialize};

/// The five relative motions of two voices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionType {
    /// Same direction, same interval class before and after (fifth to fifth).
    Parallel,
    /// Same direction, interval class changes.
    Similar,
    /// Opposite directions.
    Contrary,
    /// Exactly one voice moves.
    Oblique,
    /// Neither voice moves.
    Static,
}

/// The transition between two adjacent simultaneities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub motion: MotionType,
    /// Signed semitone step of the reference voice.
    pub reference_step: i32,
    /// Signed semitone step of the subject voice.
    pub subject_step: i32,
}

/// Classify the motion from (prev_ref, prev_subj) to (cur_ref, cur_subj).
pub fn classify_motion(prev_ref: i32, cur_ref: i32, prev_subj: i32, cur_subj: i32) -> MotionEvent {
    let reference_step = cur_ref - prev_ref;
    let subject_step = cur_subj - prev_subj;

    let motion = if reference_step == 0 && subject_step == 0 {
        MotionType::Static
    } else if reference_step == 0 || subject_step == 0 {
        MotionType::Oblique
    } else if (reference_step > 0) != (subject_step > 0) {
        MotionType::Contrary
    } else {
        let class_before = (prev_ref - prev_subj).abs() % 12;
        let class_after = (cur_ref - cur_subj).abs() % 12;
        if class_before == class_after {
            MotionType::Parallel
        } else {
            MotionType::Similar
        }
    };

    MotionEvent {
        motion,
        reference_step,
        subject_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_oblique() {
        assert_eq!(classify_motion(60, 60, 67, 67).motion, MotionType::Static);
        assert_eq!(classify_motion(60, 60, 67, 69).motion, MotionType::Oblique);
        assert_eq!(classify_motion(60, 62, 67, 67).motion, MotionType::Oblique);
    }

    #[test]
    fn test_contrary() {
        let ev = classify_motion(62, 60, 67, 69);
        assert_eq!(ev.motion, MotionType::Contrary);
        assert_eq!(ev.reference_step, -2);
        assert_eq!(ev.subject_step, 2);
    }

    #[test]
    fn test_parallel_fifths() {
        // C4/G4 moving to D4/A4: fifth to fifth, both up.
        let ev = classify_motion(60, 62, 67, 69);
        assert_eq!(ev.motion, MotionType::Parallel);
    }

    #[test]
    fn test_similar_when_class_changes() {
        // C4/E4 (third) moving up to D4/A4 (fifth): same direction, new class.
        let ev = classify_motion(60, 62, 64, 69);
        assert_eq!(ev.motion, MotionType::Similar);
    }

    #[test]
    fn test_unison_to_octave_is_parallel() {
        // Both classes reduce to 0, same direction.
        let ev = classify_motion(60, 62, 60, 74);
        assert_eq!(ev.motion, MotionType::Parallel);
    }
}
