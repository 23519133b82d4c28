// Request and report envelopes for one validation call.
//
// The UI sends a `ValidationRequest` (two voices plus a species selector)
// and receives a `ValidationResponse`: either the full musical report, or a
// `REQUEST_INVALID` rejection when the request is structurally malformed
// (mismatched durations, rhythm inconsistent with the species, and so on).
// Structural rejections never appear inside a report's violation list — the
// two failure classes are disjoint on the wire as well as in the engine.

use serde::{Deserialize, Serialize};

use crate::types::{Severity, Species, Violation, WireNote};

/// Wire code carried by every structural rejection.
pub const REQUEST_INVALID: &str = "REQUEST_INVALID";

/// One exercise to validate: the fixed reference voice (cantus firmus), the
/// subject voice being judged, and the species discipline to judge it under.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub reference_voice: Vec<WireNote>,
    pub subject_voice: Vec<WireNote>,
    pub species: Species,
}

/// The engine's verdict on one structurally valid exercise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub score: u32,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Count of error-severity violations (warnings excluded).
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }
}

/// A structural rejection: the request never reached the rule tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRejected {
    /// Always [`REQUEST_INVALID`].
    pub code: String,
    pub reason: String,
}

/// What the caller gets back: a report, or a structural rejection.
///
/// Serialized untagged — a report and a rejection have disjoint field sets,
/// so the UI distinguishes them by shape (presence of `code`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationResponse {
    Report(ValidationReport),
    Rejected(RequestRejected),
}

impl ValidationResponse {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ValidationResponse::Rejected(RequestRejected {
            code: REQUEST_INVALID.to_string(),
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleId;

    fn sample_request() -> ValidationRequest {
        ValidationRequest {
            reference_voice: vec![WireNote::new(62, 0.0, 4.0), WireNote::new(64, 4.0, 4.0)],
            subject_voice: vec![WireNote::new(69, 0.0, 4.0), WireNote::new(71, 4.0, 4.0)],
            species: Species::First,
        }
    }

    #[test]
    fn test_request_round_trip_camel_case() {
        let req = sample_request();
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("referenceVoice"), "json was {json}");
        assert!(json.contains("onsetBeat"), "json was {json}");
        assert!(json.contains("\"species\":1"), "json was {json}");
        let back: ValidationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn test_report_round_trip() {
        let report = ValidationReport {
            is_valid: false,
            score: 80,
            violations: vec![
                Violation::error(RuleId::ParallelPerfects, 4.0, "parallel fifths"),
                Violation::warning(RuleId::Climax, 8.0, "highest pitch reached twice"),
            ],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("isValid"), "json was {json}");
        let back: ValidationResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ValidationResponse::Report(report));
    }

    #[test]
    fn test_rejection_shape() {
        let resp = ValidationResponse::rejected("voices end at different beats");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(REQUEST_INVALID), "json was {json}");
        let back: ValidationResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);
    }

    #[test]
    fn test_error_count_ignores_warnings() {
        let report = ValidationReport {
            is_valid: true,
            score: 97,
            violations: vec![Violation::warning(RuleId::Range, 0.0, "wide")],
        };
        assert_eq!(report.error_count(), 0);
    }
}
