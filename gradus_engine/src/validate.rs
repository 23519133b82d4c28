// The validation entry point.
//
// One pass over the exercise: structural gate, timeline derivation, shared
// harmonic rules, species dissonance treatment per simultaneity, melodic
// line rules on the subject, then report assembly. Pure — same request and
// config in, same report out.

use gradus_protocol::message::{ValidationRequest, ValidationResponse};

use crate::config::EngineConfig;
use crate::error::RequestError;
use crate::exercise::Exercise;
use crate::report;
use crate::rules;
use crate::species::treatment_for;

/// Validate a counterpoint exercise against its declared species.
///
/// Structural problems (off-grid notes, rhythm that does not fit the
/// species, mismatched voice lengths) come back as `Err`; musical problems
/// are violations inside the `Ok` report.
pub fn validate(
    request: &ValidationRequest,
    config: &EngineConfig,
) -> Result<gradus_protocol::message::ValidationReport, RequestError> {
    let exercise = Exercise::from_request(request)?;
    let timeline = exercise.timeline();

    let mut violations = Vec::new();
    rules::boundary(&timeline, &mut violations);
    rules::parallel_perfects(&timeline, &mut violations);
    rules::direct_perfects(&timeline, config, &mut violations);

    let treatment = treatment_for(exercise.species);
    for idx in 0..timeline.len() {
        treatment.check(&timeline, idx, &mut violations);
    }

    let line = rules::subject_line(&timeline);
    rules::melodic_line_checks(&line, &config.melodic, &mut violations);
    rules::voice_crossing(&timeline, &config.melodic, &mut violations);

    Ok(report::build(violations, &config.scoring))
}

/// Validate and fold the result into the wire response, mapping structural
/// errors to the `REQUEST_INVALID` rejection.
pub fn respond(request: &ValidationRequest, config: &EngineConfig) -> ValidationResponse {
    match validate(request, config) {
        Ok(report) => ValidationResponse::Report(report),
        Err(err) => err.to_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradus_protocol::types::{RuleId, Species, WireNote};

    fn whole_notes(pitches: &[i32]) -> Vec<WireNote> {
        pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| WireNote::new(p, i as f64 * 4.0, 4.0))
            .collect()
    }

    fn request(reference: &[i32], subject: &[i32], species: Species) -> ValidationRequest {
        ValidationRequest {
            reference_voice: whole_notes(reference),
            subject_voice: whole_notes(subject),
            species,
        }
    }

    #[test]
    fn test_parallel_fifths_fail() {
        let req = request(&[60, 62, 64, 62], &[67, 69, 71, 69], Species::First);
        let report = validate(&req, &EngineConfig::default()).unwrap();
        assert!(!report.is_valid);
        let parallels = report
            .violations
            .iter()
            .filter(|v| v.rule == RuleId::ParallelPerfects)
            .count();
        assert_eq!(parallels, 3, "report: {report:?}");
    }

    #[test]
    fn test_structural_error_becomes_rejection() {
        let mut req = request(&[60, 62, 64, 62], &[67, 69, 71, 69], Species::First);
        req.subject_voice[1].onset_beat = 4.3;
        let response = respond(&req, &EngineConfig::default());
        match response {
            ValidationResponse::Rejected(r) => {
                assert_eq!(r.code, gradus_protocol::message::REQUEST_INVALID);
                assert!(r.reason.contains("grid"), "reason: {}", r.reason);
            }
            ValidationResponse::Report(_) => panic!("expected a rejection"),
        }
    }

    #[test]
    fn test_strict_direct_perfects_escalates() {
        // C4/E4 -> G4 over G3... build a line with a hidden fifth: both
        // voices rise into a fifth, subject leaping.
        let req = request(&[60, 62, 64, 62], &[64, 69, 67, 74], Species::First);
        let lenient = validate(&req, &EngineConfig::default()).unwrap();
        let direct_warnings = lenient
            .violations
            .iter()
            .filter(|v| v.rule == RuleId::DirectPerfects)
            .count();
        assert!(direct_warnings > 0, "report: {lenient:?}");

        let config = EngineConfig {
            strict_direct_perfects: true,
            ..EngineConfig::default()
        };
        let strict = validate(&req, &config).unwrap();
        assert!(strict.score < lenient.score, "errors cost more than warnings");
    }
}
