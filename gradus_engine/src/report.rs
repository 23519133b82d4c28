// Report assembly.
//
// Collects the violations the rule tables produced into the wire report:
// deterministic ordering (beat, then severity, then rule), duplicate
// suppression, score arithmetic, and the pass/fail verdict. The same
// request always yields the same report, byte for byte.

use gradus_protocol::message::ValidationReport;
use gradus_protocol::types::{RuleId, Severity, Violation};

use crate::config::ScoreWeights;

fn sort_key(v: &Violation) -> (f64, u8, RuleId) {
    let severity = match v.severity {
        Severity::Error => 0,
        Severity::Warning => 1,
    };
    (v.beat, severity, v.rule)
}

/// Assemble the final report from raw violations.
pub fn build(mut violations: Vec<Violation>, weights: &ScoreWeights) -> ValidationReport {
    violations.sort_by(|a, b| {
        let (ab, asv, ar) = sort_key(a);
        let (bb, bsv, br) = sort_key(b);
        ab.total_cmp(&bb).then(asv.cmp(&bsv)).then(ar.cmp(&br))
    });
    violations.dedup();

    // A direct-perfects warning at the same beat as a parallel-perfects
    // error describes the same motion; the error subsumes it.
    let parallel_beats: Vec<f64> = violations
        .iter()
        .filter(|v| v.rule == RuleId::ParallelPerfects && v.severity == Severity::Error)
        .map(|v| v.beat)
        .collect();
    violations.retain(|v| {
        !(v.rule == RuleId::DirectPerfects
            && v.severity == Severity::Warning
            && parallel_beats.iter().any(|&b| b == v.beat))
    });

    let mut score: u32 = 100;
    let mut errors = 0usize;
    for v in &violations {
        let deduction = match v.severity {
            Severity::Error => {
                errors += 1;
                weights.error_deduction
            }
            Severity::Warning => weights.warning_deduction,
        };
        score = score.saturating_sub(deduction);
    }

    ValidationReport {
        is_valid: errors == 0 && score >= weights.passing_score,
        score,
        violations,
    }
}
