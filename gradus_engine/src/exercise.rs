// Exercise model: tick grid, structural validation, and the timeline.
//
// Wire notes arrive in quarter-note beats as JSON numbers. The engine
// quantizes them onto a sixteenth-note integer tick grid (4 ticks per
// beat), so every alignment and duration comparison is exact integer
// arithmetic — no rational type, no float drift. Off-grid input is a
// structural error, not a musical violation.
//
// `Exercise::from_request` is the single gate between the wire and the rule
// tables: it enforces every precondition (contiguity, pitch range, uniform
// reference, total duration, species rhythm) and hands back a value the
// rules may trust completely. The `Timeline` it derives — one simultaneity
// per attack point where both voices sound — is the only view of the music
// the rules ever see.

use gradus_protocol::message::ValidationRequest;
use gradus_protocol::types::{Species, WireNote};

use crate::error::{RequestError, VoiceRole};
use crate::motion::{MotionEvent, classify_motion};
use crate::pitch::{Interval, classify_interval};

/// Sixteenth-note resolution: 4 ticks per quarter-note beat.
pub const TICKS_PER_BEAT: u32 = 4;

/// Sane instrument range (piano compass), inclusive.
pub const PITCH_LOW: i32 = 21;
pub const PITCH_HIGH: i32 = 108;

/// A cantus shorter than this is not an exercise.
pub const MIN_REFERENCE_NOTES: usize = 4;

/// One quantized note: onset and duration in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickNote {
    pub pitch: i32,
    pub onset: u32,
    pub duration: u32,
}

impl TickNote {
    pub fn end(self) -> u32 {
        self.onset + self.duration
    }

    pub fn onset_beat(self) -> f64 {
        self.onset as f64 / TICKS_PER_BEAT as f64
    }
}

/// Convert a beat position to ticks, rejecting off-grid and negative values.
fn beats_to_ticks(beats: f64, role: VoiceRole, at_beat: f64) -> Result<u32, RequestError> {
    let scaled = beats * TICKS_PER_BEAT as f64;
    let rounded = scaled.round();
    if beats < 0.0 || (scaled - rounded).abs() > 1e-6 || rounded > u32::MAX as f64 {
        return Err(RequestError::OffGrid {
            role,
            beat: at_beat,
        });
    }
    Ok(rounded as u32)
}

/// Quantize one voice and enforce its local invariants: non-empty, on-grid,
/// in range, sorted, and contiguous (no rest inside the voice).
fn quantize_voice(notes: &[WireNote], role: VoiceRole) -> Result<Vec<TickNote>, RequestError> {
    if notes.is_empty() {
        return Err(RequestError::EmptyVoice { role });
    }
    let mut out = Vec::with_capacity(notes.len());
    for note in notes {
        if note.pitch < PITCH_LOW || note.pitch > PITCH_HIGH {
            return Err(RequestError::PitchOutOfRange {
                pitch: note.pitch,
                low: PITCH_LOW,
                high: PITCH_HIGH,
            });
        }
        let onset = beats_to_ticks(note.onset_beat, role, note.onset_beat)?;
        let duration = beats_to_ticks(note.duration_beats, role, note.onset_beat)?;
        if duration == 0 {
            return Err(RequestError::OffGrid {
                role,
                beat: note.onset_beat,
            });
        }
        out.push(TickNote {
            pitch: note.pitch,
            onset,
            duration,
        });
    }
    for pair in out.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let beat = next.onset as f64 / TICKS_PER_BEAT as f64;
        if next.onset < prev.end() {
            return Err(RequestError::OverlappingNotes { role, beat });
        }
        if next.onset > prev.end() {
            return Err(RequestError::GapInVoice { role, beat });
        }
    }
    Ok(out)
}

/// A structurally valid exercise, ready for the rule tables.
#[derive(Clone, Debug)]
pub struct Exercise {
    pub reference: Vec<TickNote>,
    pub subject: Vec<TickNote>,
    pub species: Species,
    /// Length of one measure in ticks, defined by the uniform reference
    /// note duration.
    pub measure_ticks: u32,
}

impl Exercise {
    /// The structural gate: every structural precondition, checked before
    /// any musical rule runs.
    pub fn from_request(request: &ValidationRequest) -> Result<Self, RequestError> {
        let reference = quantize_voice(&request.reference_voice, VoiceRole::Reference)?;
        let subject = quantize_voice(&request.subject_voice, VoiceRole::Subject)?;

        if reference[0].onset != 0 {
            return Err(RequestError::GapInVoice {
                role: VoiceRole::Reference,
                beat: 0.0,
            });
        }
        if reference.len() < MIN_REFERENCE_NOTES {
            return Err(RequestError::ReferenceTooShort {
                got: reference.len(),
                min: MIN_REFERENCE_NOTES,
            });
        }
        let measure_ticks = reference[0].duration;
        if reference.iter().any(|n| n.duration != measure_ticks) {
            return Err(RequestError::NonUniformReference);
        }
        if measure_ticks != 3 * TICKS_PER_BEAT && measure_ticks != 4 * TICKS_PER_BEAT {
            return Err(RequestError::UnsupportedMeasure {
                beats: measure_ticks as f64 / TICKS_PER_BEAT as f64,
            });
        }

        let reference_end = reference.last().map(|n| n.end()).unwrap_or(0);
        let subject_end = subject.last().map(|n| n.end()).unwrap_or(0);
        if reference_end != subject_end {
            return Err(RequestError::DurationMismatch {
                reference: reference_end as f64 / TICKS_PER_BEAT as f64,
                subject: subject_end as f64 / TICKS_PER_BEAT as f64,
            });
        }

        let exercise = Exercise {
            reference,
            subject,
            species: request.species,
            measure_ticks,
        };
        exercise.check_species_rhythm()?;
        Ok(exercise)
    }

    pub fn total_measures(&self) -> usize {
        (self.reference.len() * self.reference[0].duration as usize) / self.measure_ticks as usize
    }

    /// Check that the subject's attack pattern fits the declared species.
    ///
    /// The check is per measure, with the conventional allowances: species
    /// 2-5 may enter after an initial rest, and the final measure closes on
    /// a single long note. Species 1 additionally tolerates half-measure
    /// subdivision so an over-subdivided submission is judged musically
    /// (every simultaneity must then be consonant) rather than bounced at
    /// the door; rhythms coarser or finer than that stay structural errors.
    fn check_species_rhythm(&self) -> Result<(), RequestError> {
        let total = self.total_measures();
        let mut per_measure: Vec<Vec<u32>> = vec![Vec::new(); total];
        for note in &self.subject {
            let m = (note.onset / self.measure_ticks) as usize;
            if m < total {
                per_measure[m].push(note.onset % self.measure_ticks);
            }
        }
        let entry = per_measure
            .iter()
            .position(|rel| !rel.is_empty())
            .unwrap_or(0);
        let half = self.measure_ticks / 2;
        let beats: Vec<u32> = (0..self.measure_ticks).step_by(TICKS_PER_BEAT as usize).collect();

        for (m, rel) in per_measure.iter().enumerate() {
            if m < entry {
                continue;
            }
            let is_first = m == entry;
            let is_last = m + 1 == total;
            let ok = match self.species {
                Species::First => {
                    rel.contains(&0) && rel.iter().all(|&t| t == 0 || t == half)
                }
                Species::Second => {
                    let split = rel == &[0, half];
                    if is_first {
                        split || rel == &[half]
                    } else if is_last {
                        split || rel == &[0]
                    } else {
                        split
                    }
                }
                Species::Third => {
                    if is_last {
                        rel == &[0] || rel == &beats
                    } else if is_first {
                        !rel.is_empty() && beats.ends_with(rel)
                    } else {
                        rel == &beats
                    }
                }
                Species::Fourth => {
                    !rel.is_empty()
                        && rel.iter().all(|&t| t == 0 || t == half)
                        && (is_first || is_last || rel.contains(&half))
                }
                Species::Florid => {
                    // Any mixture, down to the eighth-note grid.
                    !rel.is_empty() && rel.iter().all(|&t| t % 2 == 0)
                }
            };
            if !ok {
                return Err(RequestError::SpeciesMismatch {
                    species: self.species.number(),
                    measure: m + 1,
                });
            }
        }
        Ok(())
    }

    /// Derive the ordered simultaneity timeline: one entry per attack point
    /// (in either voice) where both voices sound.
    pub fn timeline(&self) -> Timeline {
        let subject_start = self.subject[0].onset;
        let mut ticks: Vec<u32> = self
            .reference
            .iter()
            .map(|n| n.onset)
            .filter(|&t| t >= subject_start)
            .chain(self.subject.iter().map(|n| n.onset))
            .collect();
        ticks.sort_unstable();
        ticks.dedup();

        let mut sims = Vec::with_capacity(ticks.len());
        let mut ri = 0usize;
        let mut si = 0usize;
        for tick in ticks {
            while ri + 1 < self.reference.len() && self.reference[ri].end() <= tick {
                ri += 1;
            }
            while si + 1 < self.subject.len() && self.subject[si].end() <= tick {
                si += 1;
            }
            let reference = self.reference[ri];
            let subject = self.subject[si];
            debug_assert!(reference.onset <= tick && tick < reference.end());
            debug_assert!(subject.onset <= tick && tick < subject.end());
            sims.push(Simultaneity {
                tick,
                measure: (tick / self.measure_ticks) as usize,
                reference_pitch: reference.pitch,
                subject_pitch: subject.pitch,
                reference_attack: reference.onset == tick,
                subject_attack: subject.onset == tick,
                subject_note: si,
            });
        }

        // Every subject onset produced a simultaneity, so this map is total.
        let mut onset_sims = vec![0usize; self.subject.len()];
        for (idx, sim) in sims.iter().enumerate() {
            if sim.subject_attack {
                onset_sims[sim.subject_note] = idx;
            }
        }

        Timeline {
            sims,
            subject: self.subject.clone(),
            onset_sims,
            measure_ticks: self.measure_ticks,
        }
    }
}

/// One vertical slice: the reference and subject notes sounding at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Simultaneity {
    pub tick: u32,
    pub measure: usize,
    pub reference_pitch: i32,
    pub subject_pitch: i32,
    /// The reference note starts here (a downbeat).
    pub reference_attack: bool,
    /// The subject note starts here (false means it is held over).
    pub subject_attack: bool,
    /// Index of the sounding subject note in `Timeline::subject`.
    pub subject_note: usize,
}

/// The derived timeline the rule tables operate on. Read-only.
#[derive(Clone, Debug)]
pub struct Timeline {
    pub sims: Vec<Simultaneity>,
    /// The subject voice, for melodic lookback across simultaneities.
    pub subject: Vec<TickNote>,
    /// For each subject note, the simultaneity index at its onset.
    onset_sims: Vec<usize>,
    pub measure_ticks: u32,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.sims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sims.is_empty()
    }

    /// Beat position of a simultaneity, for violation records.
    pub fn beat(&self, idx: usize) -> f64 {
        self.sims[idx].tick as f64 / TICKS_PER_BEAT as f64
    }

    /// Human measure number (1-based) for message text.
    pub fn measure_number(&self, idx: usize) -> usize {
        self.sims[idx].measure + 1
    }

    pub fn interval(&self, idx: usize) -> Interval {
        let sim = &self.sims[idx];
        classify_interval(sim.reference_pitch, sim.subject_pitch)
    }

    /// Motion from simultaneity `idx - 1` into `idx`.
    pub fn motion_into(&self, idx: usize) -> MotionEvent {
        debug_assert!(idx >= 1 && idx < self.sims.len());
        let prev = &self.sims[idx - 1];
        let cur = &self.sims[idx];
        classify_motion(
            prev.reference_pitch,
            cur.reference_pitch,
            prev.subject_pitch,
            cur.subject_pitch,
        )
    }

    /// The simultaneity at a subject note's own onset.
    pub fn onset_sim(&self, note: usize) -> usize {
        self.onset_sims[note]
    }

    pub fn subject_pitch(&self, note: usize) -> i32 {
        self.subject[note].pitch
    }

    pub fn subject_pitch_before(&self, note: usize) -> Option<i32> {
        note.checked_sub(1).map(|j| self.subject[j].pitch)
    }

    pub fn subject_pitch_after(&self, note: usize) -> Option<i32> {
        self.subject.get(note + 1).map(|n| n.pitch)
    }

    pub fn subject_measure(&self, note: usize) -> usize {
        (self.subject[note].onset / self.measure_ticks) as usize
    }
}
