// Rule checks shared by every species.
//
// Each check is a pure function of the timeline (or of the subject's
// melodic line alone) and a bounded window; none keeps state across calls.
// Checks push `Violation`s in timeline order — the report builder does the
// final sorting and dedup. The species-specific dissonance treatment lives
// in species.rs; everything here applies to all five rule tables.
//
// The melodic-line checks take a plain (beat, pitch) slice rather than the
// timeline, so the exercise generator can vet freshly drafted canti with
// the exact rules the validator enforces.

use gradus_protocol::types::{RuleId, Violation};

use crate::config::{EngineConfig, MelodicLimits};
use crate::exercise::Timeline;
use crate::motion::MotionType;
use crate::pitch::{is_leap, is_step, pitch_name};

/// A melodic line as (beat, pitch) pairs, in time order.
pub type LinePoint = (f64, i32);

/// First and last intervals must be perfect; the penultimate must be an
/// imperfect consonance resolving to the final by contrary motion with a
/// step in at least one voice.
pub fn boundary(timeline: &Timeline, out: &mut Vec<Violation>) {
    let n = timeline.len();
    if n == 0 {
        return;
    }
    let first = timeline.interval(0);
    if !first.is_perfect() {
        out.push(Violation::error(
            RuleId::Boundary,
            timeline.beat(0),
            format!(
                "opening interval is a {}; begin with a unison, fifth, or octave",
                first.class_name()
            ),
        ));
    }
    let last = timeline.interval(n - 1);
    if !last.is_perfect() {
        out.push(Violation::error(
            RuleId::Boundary,
            timeline.beat(n - 1),
            format!(
                "final interval is a {}; end with a unison, fifth, or octave",
                last.class_name()
            ),
        ));
    }
    if n < 2 {
        return;
    }
    let penultimate = timeline.interval(n - 2);
    if !penultimate.is_imperfect() {
        out.push(Violation::error(
            RuleId::Boundary,
            timeline.beat(n - 2),
            format!(
                "penultimate interval is a {}; approach the final through an imperfect consonance",
                penultimate.class_name()
            ),
        ));
    } else {
        let approach = timeline.motion_into(n - 1);
        let stepwise = is_step(approach.reference_step) || is_step(approach.subject_step);
        if approach.motion != MotionType::Contrary || !stepwise {
            out.push(Violation::error(
                RuleId::Boundary,
                timeline.beat(n - 1),
                "the final interval is not approached by contrary stepwise motion",
            ));
        }
    }
}

/// Consecutive perfect consonances in parallel motion.
pub fn parallel_perfects(timeline: &Timeline, out: &mut Vec<Violation>) {
    for idx in 1..timeline.len() {
        let prev = timeline.interval(idx - 1);
        let cur = timeline.interval(idx);
        if !prev.is_perfect() || !cur.is_perfect() {
            continue;
        }
        if timeline.motion_into(idx).motion == MotionType::Parallel {
            let what = if cur.class_reduced == 7 {
                "parallel fifths"
            } else {
                "parallel octaves"
            };
            out.push(Violation::error(
                RuleId::ParallelPerfects,
                timeline.beat(idx),
                format!("{what} into measure {}", timeline.measure_number(idx)),
            ));
        }
    }
}

/// Direct (hidden) perfects: a perfect consonance reached by similar motion
/// with a leap in the subject. Warning by default; strict rule sets
/// escalate to error.
pub fn direct_perfects(timeline: &Timeline, config: &EngineConfig, out: &mut Vec<Violation>) {
    for idx in 1..timeline.len() {
        let cur = timeline.interval(idx);
        if !cur.is_perfect() {
            continue;
        }
        let motion = timeline.motion_into(idx);
        if motion.motion != MotionType::Similar
            || !is_leap(motion.subject_step, config.melodic.leap_threshold)
        {
            continue;
        }
        let message = format!(
            "direct motion into a {}; the subject leaps in similar motion",
            cur.class_name()
        );
        let beat = timeline.beat(idx);
        if config.strict_direct_perfects {
            out.push(Violation::error(RuleId::DirectPerfects, beat, message));
        } else {
            out.push(Violation::warning(RuleId::DirectPerfects, beat, message));
        }
    }
}

/// Voice crossing beyond the configured tolerance, one warning per
/// contiguous crossing episode. Which voice is "above" is fixed by the
/// first simultaneity.
pub fn voice_crossing(timeline: &Timeline, limits: &MelodicLimits, out: &mut Vec<Violation>) {
    if timeline.is_empty() {
        return;
    }
    let first = &timeline.sims[0];
    let subject_above = first.subject_pitch >= first.reference_pitch;
    let mut in_episode = false;
    for (idx, sim) in timeline.sims.iter().enumerate() {
        let overlap = if subject_above {
            sim.reference_pitch - sim.subject_pitch
        } else {
            sim.subject_pitch - sim.reference_pitch
        };
        let crossed = overlap > limits.crossing_tolerance;
        if crossed && !in_episode {
            let side = if subject_above { "below" } else { "above" };
            out.push(Violation::warning(
                RuleId::VoiceCrossing,
                timeline.beat(idx),
                format!("subject crosses {side} the reference voice"),
            ));
        }
        in_episode = crossed;
    }
}

/// Extract the subject's melodic line from the timeline.
pub fn subject_line(timeline: &Timeline) -> Vec<LinePoint> {
    timeline
        .subject
        .iter()
        .map(|n| (n.onset_beat(), n.pitch))
        .collect()
}

/// Run every melodic-line rule: leap recovery, forbidden intervals, climax
/// uniqueness, and range span.
pub fn melodic_line_checks(line: &[LinePoint], limits: &MelodicLimits, out: &mut Vec<Violation>) {
    leap_recovery(line, limits, out);
    melodic_intervals(line, limits, out);
    climax(line, out);
    range_span(line, limits, out);
}

/// A leap must be answered by an opposite-direction motion no larger than
/// the leap itself. Only fires once the full three-note window exists — a
/// trailing leap with no note after it is not a violation.
pub fn leap_recovery(line: &[LinePoint], limits: &MelodicLimits, out: &mut Vec<Violation>) {
    for j in 1..line.len().saturating_sub(1) {
        let leap = line[j].1 - line[j - 1].1;
        if !is_leap(leap, limits.leap_threshold) {
            continue;
        }
        let next = line[j + 1].1 - line[j].1;
        let recovered = next != 0 && (next > 0) != (leap > 0) && next.abs() <= leap.abs();
        if !recovered {
            let how = if next != 0 && (next > 0) == (leap > 0) {
                "continues in the same direction"
            } else {
                "is not answered by a smaller opposite motion"
            };
            out.push(Violation::warning(
                RuleId::LeapRecovery,
                line[j + 1].0,
                format!("leap of {} semitones {how}", leap.abs()),
            ));
        }
    }
}

/// Forbidden melodic intervals: the tritone, leaps larger than a minor
/// sixth except the octave, and two same-direction leaps spanning more
/// than an octave.
pub fn melodic_intervals(line: &[LinePoint], limits: &MelodicLimits, out: &mut Vec<Violation>) {
    for j in 1..line.len() {
        let step = line[j].1 - line[j - 1].1;
        let size = step.abs();
        if size == 6 {
            out.push(Violation::error(
                RuleId::MelodicInterval,
                line[j].0,
                "melodic tritone in the subject",
            ));
        } else if (9..=11).contains(&size) || size > 12 {
            out.push(Violation::error(
                RuleId::MelodicInterval,
                line[j].0,
                format!("melodic leap of {size} semitones; nothing beyond a minor sixth except the octave"),
            ));
        }
        if j >= 2 {
            let prev = line[j - 1].1 - line[j - 2].1;
            let same_direction = prev != 0 && step != 0 && (prev > 0) == (step > 0);
            if same_direction
                && is_leap(prev, limits.leap_threshold)
                && is_leap(step, limits.leap_threshold)
                && prev.abs() + size > 12
            {
                out.push(Violation::error(
                    RuleId::MelodicInterval,
                    line[j].0,
                    "two same-direction leaps spanning more than an octave",
                ));
            }
        }
    }
}

/// The subject should reach its highest pitch exactly once.
pub fn climax(line: &[LinePoint], out: &mut Vec<Violation>) {
    let Some(max) = line.iter().map(|&(_, p)| p).max() else {
        return;
    };
    let mut seen = false;
    for &(beat, pitch) in line {
        if pitch != max {
            continue;
        }
        if seen {
            out.push(Violation::warning(
                RuleId::Climax,
                beat,
                format!("highest pitch {} is reached more than once", pitch_name(max)),
            ));
            return;
        }
        seen = true;
    }
}

/// The subject's total span should stay within the configured range.
pub fn range_span(line: &[LinePoint], limits: &MelodicLimits, out: &mut Vec<Violation>) {
    let mut low = i32::MAX;
    let mut high = i32::MIN;
    for &(beat, pitch) in line {
        low = low.min(pitch);
        high = high.max(pitch);
        if high - low > limits.max_range {
            out.push(Violation::warning(
                RuleId::Range,
                beat,
                format!(
                    "subject spans {} semitones, beyond the allowed {}",
                    high - low,
                    limits.max_range
                ),
            ));
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(pitches: &[i32]) -> Vec<LinePoint> {
        pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| (i as f64, p))
            .collect()
    }

    #[test]
    fn test_leap_recovery_same_direction_warns() {
        let mut out = Vec::new();
        leap_recovery(&line(&[60, 65, 67]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1, "violations: {out:?}");
        assert_eq!(out[0].rule, RuleId::LeapRecovery);
    }

    #[test]
    fn test_leap_recovery_opposite_step_is_clean() {
        let mut out = Vec::new();
        leap_recovery(&line(&[60, 65, 64]), &MelodicLimits::default(), &mut out);
        assert!(out.is_empty(), "violations: {out:?}");
    }

    #[test]
    fn test_leap_recovery_oversized_recovery_warns() {
        let mut out = Vec::new();
        leap_recovery(&line(&[60, 64, 57]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1, "violations: {out:?}");
    }

    #[test]
    fn test_trailing_leap_is_not_premature() {
        // The leap has no note after it yet; the three-note window is
        // incomplete, so nothing may fire.
        let mut out = Vec::new();
        leap_recovery(&line(&[60, 62, 69]), &MelodicLimits::default(), &mut out);
        assert!(out.is_empty(), "violations: {out:?}");
    }

    #[test]
    fn test_melodic_tritone_and_oversized_leaps() {
        let mut out = Vec::new();
        melodic_intervals(&line(&[60, 66]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("tritone"));

        let mut out = Vec::new();
        melodic_intervals(&line(&[60, 69]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1, "a major sixth leap is forbidden");

        let mut out = Vec::new();
        melodic_intervals(&line(&[60, 72]), &MelodicLimits::default(), &mut out);
        assert!(out.is_empty(), "the octave is allowed: {out:?}");
    }

    #[test]
    fn test_stacked_leaps_past_an_octave() {
        // Up a fifth then up a sixth: 7 + 8 = 15 semitones, same direction.
        let mut out = Vec::new();
        melodic_intervals(&line(&[53, 60, 68]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1, "violations: {out:?}");
        assert!(out[0].message.contains("same-direction"));
    }

    #[test]
    fn test_climax_repeat_warns_once() {
        let mut out = Vec::new();
        climax(&line(&[60, 67, 64, 67, 62, 67]), &mut out);
        assert_eq!(out.len(), 1, "one warning per line, not per repeat");
        assert_eq!(out[0].beat, 3.0, "flagged at the second occurrence");
    }

    #[test]
    fn test_range_span() {
        let mut out = Vec::new();
        range_span(&line(&[60, 77]), &MelodicLimits::default(), &mut out);
        assert_eq!(out.len(), 1);

        let mut out = Vec::new();
        range_span(&line(&[60, 76]), &MelodicLimits::default(), &mut out);
        assert!(out.is_empty(), "a major tenth is allowed");
    }
}
