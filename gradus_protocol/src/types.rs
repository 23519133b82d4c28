// Core wire types for the counterpoint trainer.
//
// These are the leaf records used by both `message.rs` (request/report
// envelopes) and the engine's rule code. Species serializes as the plain
// integers 1-5 the UI already speaks; severity and rule identifiers are
// fixed lowercase strings so the UI can key styling and help text off them
// without parsing prose.

use serde::{Deserialize, Serialize};

/// One note as the UI sends it: absolute MIDI pitch plus onset and duration
/// in quarter-note beats (beat 0 is the start of the exercise).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNote {
    pub pitch: i32,
    pub onset_beat: f64,
    pub duration_beats: f64,
}

impl WireNote {
    pub fn new(pitch: i32, onset_beat: f64, duration_beats: f64) -> Self {
        WireNote {
            pitch,
            onset_beat,
            duration_beats,
        }
    }
}

/// The five species disciplines, in Fux's order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Species {
    /// Note against note.
    First,
    /// Two notes against one.
    Second,
    /// Three or four notes against one.
    Third,
    /// Syncopated suspensions.
    Fourth,
    /// Florid: free mixture of the second through fourth species figures.
    Florid,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::First,
        Species::Second,
        Species::Third,
        Species::Fourth,
        Species::Florid,
    ];

    /// The 1-5 number the UI and the wire format use.
    pub fn number(self) -> u8 {
        match self {
            Species::First => 1,
            Species::Second => 2,
            Species::Third => 3,
            Species::Fourth => 4,
            Species::Florid => 5,
        }
    }
}

impl TryFrom<u8> for Species {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Species::First),
            2 => Ok(Species::Second),
            3 => Ok(Species::Third),
            4 => Ok(Species::Fourth),
            5 => Ok(Species::Florid),
            other => Err(format!("species must be 1-5, got {other}")),
        }
    }
}

impl From<Species> for u8 {
    fn from(species: Species) -> u8 {
        species.number()
    }
}

/// How bad a violation is. Errors fail the exercise; warnings only cost score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable identifiers for every rule the engine enforces. The UI keys
/// per-rule help text off these strings, so renaming one is a wire break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Boundary,
    ParallelPerfects,
    DirectPerfects,
    Dissonance,
    LeapRecovery,
    MelodicInterval,
    Climax,
    Range,
    VoiceCrossing,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::Boundary => "boundary",
            RuleId::ParallelPerfects => "parallel_perfects",
            RuleId::DirectPerfects => "direct_perfects",
            RuleId::Dissonance => "dissonance",
            RuleId::LeapRecovery => "leap_recovery",
            RuleId::MelodicInterval => "melodic_interval",
            RuleId::Climax => "climax",
            RuleId::Range => "range",
            RuleId::VoiceCrossing => "voice_crossing",
        }
    }
}

/// One finding from the validation pass, positioned on the beat timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleId,
    pub message: String,
    pub beat: f64,
    pub severity: Severity,
}

impl Violation {
    pub fn error(rule: RuleId, beat: f64, message: impl Into<String>) -> Self {
        Violation {
            rule,
            message: message.into(),
            beat,
            severity: Severity::Error,
        }
    }

    pub fn warning(rule: RuleId, beat: f64, message: impl Into<String>) -> Self {
        Violation {
            rule,
            message: message.into(),
            beat,
            severity: Severity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_numbers_round_trip() {
        for species in Species::ALL {
            let n = species.number();
            assert_eq!(Species::try_from(n), Ok(species));
        }
        assert!(Species::try_from(0).is_err());
        assert!(Species::try_from(6).is_err());
    }

    #[test]
    fn test_species_serializes_as_integer() {
        let json = serde_json::to_string(&Species::Fourth).unwrap();
        assert_eq!(json, "4");
        let back: Species = serde_json::from_str("2").unwrap();
        assert_eq!(back, Species::Second);
    }

    #[test]
    fn test_severity_and_rule_strings() {
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "\"error\"");
        assert_eq!(
            serde_json::to_string(&RuleId::ParallelPerfects).unwrap(),
            "\"parallel_perfects\""
        );
        let back: RuleId = serde_json::from_str("\"leap_recovery\"").unwrap();
        assert_eq!(back, RuleId::LeapRecovery);
    }

    #[test]
    fn test_violation_round_trip() {
        let v = Violation::error(RuleId::Boundary, 12.0, "final interval is a third");
        let json = serde_json::to_string(&v).unwrap();
        let back: Violation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
