// Gradus exercise generation.
//
// The validation engine checks student counterpoint; this crate produces
// the material the trainer hands out: mode-correct cantus firmus lines for
// the counterpoint exercises, random chord and progression drills for the
// other training modes, and two-track MIDI export for playback.
//
// - mode.rs: church-mode scale membership, degree mapping, cadence helpers
// - cantus.rs: weighted-walk cantus firmus generator, vetted against the
//   engine's own melodic rules
// - drills.rs: chord spelling and diatonic progression drills
// - midi.rs: SMF export of an exercise (reference + subject tracks)
//
// Generation is deterministic given a seed; every public function takes
// `&mut impl Rng`.

pub mod cantus;
pub mod drills;
pub mod midi;
pub mod mode;
