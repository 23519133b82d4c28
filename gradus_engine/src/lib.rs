// Gradus counterpoint validation engine.
//
// Given a fixed reference melody (cantus firmus) and a candidate subject
// voice, decides measure by measure whether every harmonic interval and
// melodic motion satisfies the rules of one of the five species, and
// produces an explainable violation list plus a 0-100 score.
//
// Architecture:
// - pitch.rs: interval arithmetic and consonance classification
// - motion.rs: relative-motion classifier (parallel/similar/contrary/...)
// - exercise.rs: tick-grid quantization, structural validation, timeline
// - rules.rs: rule checks shared by every species (boundary, parallel
//   perfects, leap recovery, melodic intervals, climax, range)
// - species.rs: per-species dissonance-treatment strategies
// - validate.rs: the single-pass driver over the timeline
// - report.rs: ordering, dedup, score fold, verdict
// - config.rs: the one immutable EngineConfig passed into validate
// - error.rs: structural rejections (REQUEST_INVALID), disjoint from
//   musical violations
//
// The engine is a pure synchronous computation: one request in, one report
// out, no state between calls. Validating the same exercise twice yields
// byte-identical reports.

pub mod config;
pub mod error;
pub mod exercise;
pub mod motion;
pub mod pitch;
pub mod report;
pub mod rules;
pub mod species;
pub mod validate;
