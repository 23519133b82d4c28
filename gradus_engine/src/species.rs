// Per-species dissonance treatment.
//
// The shared rules (boundary, parallels, melodic line) apply to every
// species; what changes between species is which dissonances are legal and
// how they must be approached and left. Each species implements the
// `DissonanceTreatment` strategy, invoked once per simultaneity. Florid
// writing does not get rules of its own: it dispatches each note to the
// treatment of the species its duration implies.

use gradus_protocol::types::{RuleId, Species, Violation};

use crate::exercise::Timeline;
use crate::pitch::is_step;

/// How one species treats a (possibly dissonant) simultaneity.
pub trait DissonanceTreatment {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>);
}

/// Look up the treatment for a species.
pub fn treatment_for(species: Species) -> &'static dyn DissonanceTreatment {
    match species {
        Species::First => &First,
        Species::Second => &Second,
        Species::Third => &Third,
        Species::Fourth => &Fourth,
        Species::Florid => &Florid,
    }
}

fn dissonance(timeline: &Timeline, idx: usize, message: String, out: &mut Vec<Violation>) {
    out.push(Violation::error(
        RuleId::Dissonance,
        timeline.beat(idx),
        message,
    ));
}

/// First species: note against note, every interval consonant.
pub struct First;

impl DissonanceTreatment for First {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
        let interval = timeline.interval(idx);
        if interval.is_dissonant() {
            dissonance(
                timeline,
                idx,
                format!(
                    "dissonant {}; every interval in note-against-note writing must be consonant",
                    interval.class_name()
                ),
                out,
            );
        }
    }
}

/// Is the subject note at `note` a passing tone: stepped into and out of in
/// the same direction?
fn is_passing(timeline: &Timeline, note: usize) -> bool {
    let pitch = timeline.subject_pitch(note);
    let (Some(before), Some(after)) = (
        timeline.subject_pitch_before(note),
        timeline.subject_pitch_after(note),
    ) else {
        return false;
    };
    let step_in = pitch - before;
    let step_out = after - pitch;
    is_step(step_in) && is_step(step_out) && (step_in > 0) == (step_out > 0)
}

/// Is the subject note at `note` a neighbor tone: stepped away from a pitch
/// and back to it?
fn is_neighbor(timeline: &Timeline, note: usize) -> bool {
    let pitch = timeline.subject_pitch(note);
    let (Some(before), Some(after)) = (
        timeline.subject_pitch_before(note),
        timeline.subject_pitch_after(note),
    ) else {
        return false;
    };
    is_step(pitch - before) && after == before
}

/// Second species: two notes per measure. Downbeats must be consonant;
/// upbeat dissonances must be passing or neighbor tones.
pub struct Second;

impl DissonanceTreatment for Second {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
        let interval = timeline.interval(idx);
        if !interval.is_dissonant() {
            return;
        }
        let sim = &timeline.sims[idx];
        if sim.reference_attack {
            dissonance(
                timeline,
                idx,
                format!("dissonant {} on the downbeat", interval.class_name()),
                out,
            );
            return;
        }
        if !is_passing(timeline, sim.subject_note) && !is_neighbor(timeline, sim.subject_note) {
            dissonance(
                timeline,
                idx,
                format!(
                    "dissonant {} is neither a passing tone nor a neighbor tone",
                    interval.class_name()
                ),
                out,
            );
        }
    }
}

/// Is the subject note at `note` the dissonant second note of a cambiata:
/// stepped into, left by a descending third, with the following note
/// continuing down by step?
fn is_cambiata(timeline: &Timeline, note: usize) -> bool {
    let pitch = timeline.subject_pitch(note);
    let (Some(before), Some(after)) = (
        timeline.subject_pitch_before(note),
        timeline.subject_pitch_after(note),
    ) else {
        return false;
    };
    let Some(resolution) = timeline.subject_pitch_after(note + 1) else {
        return false;
    };
    let third_down = after - pitch;
    is_step(pitch - before)
        && (third_down == -3 || third_down == -4)
        && (-2..0).contains(&(resolution - after))
}

/// Third species: four (or three) notes per measure. Like second species on
/// weak beats, plus the nota cambiata — at most one per measure.
pub struct Third;

impl DissonanceTreatment for Third {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
        let interval = timeline.interval(idx);
        if !interval.is_dissonant() {
            return;
        }
        let sim = &timeline.sims[idx];
        if sim.reference_attack {
            dissonance(
                timeline,
                idx,
                format!("dissonant {} on the downbeat", interval.class_name()),
                out,
            );
            return;
        }
        let note = sim.subject_note;
        if is_passing(timeline, note) || is_neighbor(timeline, note) {
            return;
        }
        if is_cambiata(timeline, note) {
            // A second cambiata in the same measure is excess ornament.
            let measure = timeline.subject_measure(note);
            let earlier = (0..note).any(|j| {
                timeline.subject_measure(j) == measure
                    && timeline.interval(timeline.onset_sim(j)).is_dissonant()
                    && is_cambiata(timeline, j)
            });
            if !earlier {
                return;
            }
            dissonance(
                timeline,
                idx,
                "a second nota cambiata in the same measure".to_string(),
                out,
            );
            return;
        }
        dissonance(
            timeline,
            idx,
            format!(
                "dissonant {} is neither a passing tone, a neighbor tone, nor a cambiata",
                interval.class_name()
            ),
            out,
        );
    }
}

fn check_suspension(timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
    let interval = timeline.interval(idx);
    if !interval.is_dissonant() {
        return;
    }
    let sim = &timeline.sims[idx];
    if sim.subject_attack {
        dissonance(
            timeline,
            idx,
            format!(
                "dissonant {} attacked on the beat; prepare it as a suspension",
                interval.class_name()
            ),
            out,
        );
        return;
    }
    // A held-over dissonance is a suspension. Its preparation (the same note
    // at its own onset) was already checked when that attack was visited, so
    // only the resolution is judged here: down by step into the next note.
    let note = sim.subject_note;
    let resolves = timeline
        .subject_pitch_after(note)
        .is_some_and(|after| (-2..0).contains(&(after - timeline.subject_pitch(note))));
    if !resolves {
        dissonance(
            timeline,
            idx,
            format!(
                "suspended {} must resolve down by step",
                interval.class_name()
            ),
            out,
        );
    }
}

/// Fourth species: syncopated. Attacked dissonances are forbidden; held-over
/// dissonances are suspensions, prepared by consonance and resolved down by
/// step.
pub struct Fourth;

impl DissonanceTreatment for Fourth {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
        check_suspension(timeline, idx, out);
    }
}

/// Florid: each note answers to the species its duration implies. Held-over
/// notes at a reference attack are suspensions; whole notes follow first
/// species, halves second, shorter values third.
pub struct Florid;

impl DissonanceTreatment for Florid {
    fn check(&self, timeline: &Timeline, idx: usize, out: &mut Vec<Violation>) {
        let sim = &timeline.sims[idx];
        if sim.reference_attack && !sim.subject_attack {
            check_suspension(timeline, idx, out);
            return;
        }
        let duration = timeline.subject[sim.subject_note].duration;
        if duration >= timeline.measure_ticks {
            First.check(timeline, idx, out);
        } else if duration >= timeline.measure_ticks / 2 {
            Second.check(timeline, idx, out);
        } else {
            Third.check(timeline, idx, out);
        }
    }
}
